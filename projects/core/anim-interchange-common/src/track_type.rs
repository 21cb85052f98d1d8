//! Track type enumeration shared by the blob format and the boundary API.

/// The value type stored by every track of a compressed blob.
///
/// Stored in 4 bits of the blob layout word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TrackType {
    /// One float per sample.
    Float1f = 0x00,
    /// Two floats per sample.
    Float2f = 0x01,
    /// Three floats per sample.
    Float3f = 0x02,
    /// Four floats per sample.
    Float4f = 0x03,
    /// Rotation, translation and scale per sample.
    Qvvf = 0x04,
}

impl TrackType {
    /// Convert from u8 value
    ///
    /// Returns [`None`] if the value does not correspond to a known track type.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value & 0x0F {
            0x00 => Some(Self::Float1f),
            0x01 => Some(Self::Float2f),
            0x02 => Some(Self::Float3f),
            0x03 => Some(Self::Float4f),
            0x04 => Some(Self::Qvvf),
            _ => None,
        }
    }

    /// Convert to u8 value
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Returns the scalar track type with `num_components` floats per sample.
    pub fn scalar_with_components(num_components: usize) -> Option<Self> {
        match num_components {
            1 => Some(Self::Float1f),
            2 => Some(Self::Float2f),
            3 => Some(Self::Float3f),
            4 => Some(Self::Float4f),
            _ => None,
        }
    }

    /// Number of floats per sample for scalar types, [`None`] for transforms.
    pub fn num_scalar_components(self) -> Option<usize> {
        match self {
            Self::Float1f => Some(1),
            Self::Float2f => Some(2),
            Self::Float3f => Some(3),
            Self::Float4f => Some(4),
            Self::Qvvf => None,
        }
    }
}
