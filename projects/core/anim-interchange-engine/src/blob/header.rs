//! The fixed 32 byte header at the start of every compressed blob.
//!
//! All fields are little-endian:
//!
//! | Offset | Field                                  |
//! |--------|----------------------------------------|
//! | 0x00   | total blob size in bytes               |
//! | 0x04   | xxh32 of bytes `0x08..size`            |
//! | 0x08   | tag ([`BlobKind`])                     |
//! | 0x0C   | layout word ([`LayoutWord`])           |
//! | 0x10   | track count                            |
//! | 0x14   | sample count                           |
//! | 0x18   | sample rate (`f32` bits)               |
//! | 0x1C   | reserved, zero                         |

use super::BlobError;
use anim_interchange_common::TrackType;
use bitfield::bitfield;
use endian_writer::{EndianReader, EndianWriter, LittleEndianReader, LittleEndianWriter};

/// Size of the blob header in bytes.
pub const HEADER_SIZE: usize = 32;

/// Format version written by this engine.
pub const FORMAT_VERSION: u8 = 1;

/// Offset of the first byte covered by the blob hash.
pub const HASHED_OFFSET: usize = 0x08;

const SIZE_OFFSET: isize = 0x00;
const HASH_OFFSET: isize = 0x04;
const TAG_OFFSET: isize = 0x08;
const LAYOUT_OFFSET: isize = 0x0C;
const NUM_TRACKS_OFFSET: isize = 0x10;
const NUM_SAMPLES_OFFSET: isize = 0x14;
const SAMPLE_RATE_OFFSET: isize = 0x18;
const RESERVED_OFFSET: isize = 0x1C;

/// The shape of a compressed blob, identified by its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BlobKind {
    /// Legacy transform clip. Only ever holds [`TrackType::Qvvf`] tracks.
    LegacyClip = 0xAC10_AC10,
    /// Legacy scalar track list. Only ever holds [`TrackType::Float1f`] tracks.
    LegacyTrackList = 0xAC11_AC11,
    /// Unified track list holding any [`TrackType`].
    TrackList = 0xAC12_AC12,
}

impl BlobKind {
    /// Identifies a blob shape from its tag.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0xAC10_AC10 => Some(Self::LegacyClip),
            0xAC11_AC11 => Some(Self::LegacyTrackList),
            0xAC12_AC12 => Some(Self::TrackList),
            _ => None,
        }
    }

    /// The tag stored in the header.
    #[inline]
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// The only track type this shape may hold, [`None`] if any type is allowed.
    pub fn required_track_type(self) -> Option<TrackType> {
        match self {
            Self::LegacyClip => Some(TrackType::Qvvf),
            Self::LegacyTrackList => Some(TrackType::Float1f),
            Self::TrackList => None,
        }
    }
}

bitfield! {
    /// Packed format version and track type.
    ///
    /// - Bits 0-7: Format version
    /// - Bits 8-11: Track type
    /// - Bits 12-31: Reserved, zero
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayoutWord(u32);
    impl Debug;
    u32;

    /// Format version (8 bits)
    pub version_raw, set_version_raw: 7, 0;
    /// Track type (4 bits)
    pub track_type_raw, set_track_type_raw: 11, 8;
    /// Reserved (20 bits)
    pub reserved, set_reserved: 31, 12;
}

impl LayoutWord {
    /// Creates a layout word for the given version and track type.
    pub fn new(version: u8, track_type: TrackType) -> Self {
        let mut word = Self::default();
        word.set_version_raw(version as u32);
        word.set_track_type_raw(track_type.to_u8() as u32);
        word
    }

    /// Format version.
    #[inline]
    pub fn version(&self) -> u8 {
        self.version_raw() as u8
    }

    /// Track type, [`None`] if the stored value is not a known type.
    #[inline]
    pub fn track_type(&self) -> Option<TrackType> {
        TrackType::from_u8(self.track_type_raw() as u8)
    }
}

/// Decoded blob header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobHeader {
    /// Total size of the blob in bytes, header included.
    pub size: u32,
    /// Hash of the blob from [`HASHED_OFFSET`] to `size`.
    pub hash: u32,
    /// Blob shape.
    pub kind: BlobKind,
    /// Version and track type.
    pub layout: LayoutWord,
    /// Number of tracks.
    pub num_tracks: u32,
    /// Number of samples per track.
    pub num_samples: u32,
    /// Samples per second.
    pub sample_rate: f32,
    /// Reserved, zero in every valid blob.
    pub reserved: u32,
}

impl BlobHeader {
    /// Reads the header from the start of `data`.
    ///
    /// # Errors
    ///
    /// - [`BlobError::TooShort`] if `data` is shorter than [`HEADER_SIZE`]
    /// - [`BlobError::UnknownTag`] if the tag is not a known [`BlobKind`]
    pub fn read(data: &[u8]) -> Result<Self, BlobError> {
        if data.len() < HEADER_SIZE {
            return Err(BlobError::TooShort { len: data.len() });
        }

        // SAFETY: We checked data.len() >= HEADER_SIZE, every offset below + 4 is in bounds.
        let mut reader = unsafe { LittleEndianReader::new(data.as_ptr()) };
        let tag = unsafe { reader.read_u32_at(TAG_OFFSET) };
        let kind = BlobKind::from_tag(tag).ok_or(BlobError::UnknownTag(tag))?;

        unsafe {
            Ok(Self {
                size: reader.read_u32_at(SIZE_OFFSET),
                hash: reader.read_u32_at(HASH_OFFSET),
                kind,
                layout: LayoutWord(reader.read_u32_at(LAYOUT_OFFSET)),
                num_tracks: reader.read_u32_at(NUM_TRACKS_OFFSET),
                num_samples: reader.read_u32_at(NUM_SAMPLES_OFFSET),
                sample_rate: f32::from_bits(reader.read_u32_at(SAMPLE_RATE_OFFSET)),
                reserved: reader.read_u32_at(RESERVED_OFFSET),
            })
        }
    }

    /// Writes the header into the first [`HEADER_SIZE`] bytes of `data`.
    ///
    /// # Errors
    ///
    /// [`BlobError::TooShort`] if `data` is shorter than [`HEADER_SIZE`].
    pub fn write(&self, data: &mut [u8]) -> Result<(), BlobError> {
        if data.len() < HEADER_SIZE {
            return Err(BlobError::TooShort { len: data.len() });
        }

        // SAFETY: We checked data.len() >= HEADER_SIZE, every offset below + 4 is in bounds.
        unsafe {
            let mut writer = LittleEndianWriter::new(data.as_mut_ptr());
            writer.write_u32_at(self.size, SIZE_OFFSET);
            writer.write_u32_at(self.hash, HASH_OFFSET);
            writer.write_u32_at(self.kind.tag(), TAG_OFFSET);
            writer.write_u32_at(self.layout.0, LAYOUT_OFFSET);
            writer.write_u32_at(self.num_tracks, NUM_TRACKS_OFFSET);
            writer.write_u32_at(self.num_samples, NUM_SAMPLES_OFFSET);
            writer.write_u32_at(self.sample_rate.to_bits(), SAMPLE_RATE_OFFSET);
            writer.write_u32_at(self.reserved, RESERVED_OFFSET);
        }
        Ok(())
    }

    /// Checks the fields that do not depend on the blob body.
    pub(crate) fn check_sanity(&self) -> Result<(), BlobError> {
        if (self.size as usize) < HEADER_SIZE {
            return Err(BlobError::InvalidHeader("size smaller than the header"));
        }
        if self.reserved != 0 || self.layout.reserved() != 0 {
            return Err(BlobError::InvalidHeader("reserved bits set"));
        }
        if self.num_tracks == 0 {
            return Err(BlobError::InvalidHeader("no tracks"));
        }
        if self.num_samples == 0 {
            return Err(BlobError::InvalidHeader("no samples"));
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(BlobError::InvalidHeader("invalid sample rate"));
        }

        let track_type = self
            .layout
            .track_type()
            .ok_or(BlobError::InvalidHeader("unknown track type"))?;
        if let Some(required) = self.kind.required_track_type() {
            if required != track_type {
                return Err(BlobError::InvalidHeader("track type not allowed by blob tag"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BlobHeader {
        BlobHeader {
            size: 64,
            hash: 0xDEAD_BEEF,
            kind: BlobKind::TrackList,
            layout: LayoutWord::new(FORMAT_VERSION, TrackType::Float3f),
            num_tracks: 2,
            num_samples: 10,
            sample_rate: 30.0,
            reserved: 0,
        }
    }

    #[test]
    fn test_layout_word_bitfield() {
        let word = LayoutWord::new(1, TrackType::Qvvf);
        assert_eq!(word.0, 0x0000_0401);
        assert_eq!(word.version(), 1);
        assert_eq!(word.track_type(), Some(TrackType::Qvvf));
        assert_eq!(word.reserved(), 0);

        assert_eq!(LayoutWord(0x0000_0F01).track_type(), None);
    }

    #[test]
    fn test_header_read_write() {
        let mut buffer = [0u8; HEADER_SIZE];
        let original = sample_header();

        original.write(&mut buffer).unwrap();
        assert_eq!(BlobHeader::read(&buffer).unwrap(), original);
    }

    #[test]
    fn test_little_endian_byte_order() {
        let mut buffer = [0u8; HEADER_SIZE];
        sample_header().write(&mut buffer).unwrap();

        assert_eq!(&buffer[0..4], &64u32.to_le_bytes());
        assert_eq!(&buffer[8..12], &[0x12, 0xAC, 0x12, 0xAC]);
        assert_eq!(&buffer[24..28], &30.0f32.to_bits().to_le_bytes());
    }

    #[test]
    fn test_short_and_unknown_tags_are_rejected() {
        assert_eq!(
            BlobHeader::read(&[0u8; 31]),
            Err(BlobError::TooShort { len: 31 })
        );

        let mut buffer = [0u8; HEADER_SIZE];
        buffer[8..12].copy_from_slice(&0x1234_5678u32.to_le_bytes());
        assert_eq!(
            BlobHeader::read(&buffer),
            Err(BlobError::UnknownTag(0x1234_5678))
        );
    }

    #[test]
    fn test_legacy_tags_restrict_track_type() {
        let mut header = sample_header();
        header.kind = BlobKind::LegacyClip;
        assert!(header.check_sanity().is_err());

        header.layout = LayoutWord::new(FORMAT_VERSION, TrackType::Qvvf);
        assert!(header.check_sanity().is_ok());

        header.kind = BlobKind::LegacyTrackList;
        assert!(header.check_sanity().is_err());
    }

    #[test]
    fn test_sanity_rejects_empty_and_reserved() {
        let mut header = sample_header();
        header.num_tracks = 0;
        assert!(header.check_sanity().is_err());

        let mut header = sample_header();
        header.reserved = 1;
        assert!(header.check_sanity().is_err());

        let mut header = sample_header();
        header.sample_rate = f32::NAN;
        assert!(header.check_sanity().is_err());
    }
}
