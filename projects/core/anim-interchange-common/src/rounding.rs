//! Sample rounding policy.

/// Controls how a sample time that falls between two stored samples is resolved.
///
/// The discriminants are the integer values used across the host boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum SampleRoundingPolicy {
    /// Linearly interpolate between the two surrounding samples.
    #[default]
    None = 0,
    /// Use the sample at or before the requested time.
    Floor = 1,
    /// Use the sample at or after the requested time.
    Ceil = 2,
    /// Use whichever of the two surrounding samples is closest.
    Nearest = 3,
}

impl SampleRoundingPolicy {
    /// Converts a raw host value into a policy.
    ///
    /// Returns [`None`] for values outside the recognized set.
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Floor),
            2 => Some(Self::Ceil),
            3 => Some(Self::Nearest),
            _ => None,
        }
    }

    /// Applies the policy to an interpolation weight in `[0, 1]`.
    #[inline]
    pub fn apply(self, alpha: f32) -> f32 {
        match self {
            Self::None => alpha,
            Self::Floor => 0.0,
            Self::Ceil => {
                if alpha > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Nearest => {
                if alpha >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}
