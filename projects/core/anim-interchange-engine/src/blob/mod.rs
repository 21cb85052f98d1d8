//! # Compressed Blob
//!
//! A compressed blob is a self describing byte buffer: a fixed [`header`] followed by
//! the encoded channels of every track (see [`crate::codec`]).
//!
//! [`CompressedTracks`] owns a blob produced by the compressor, [`CompressedTracksRef`]
//! borrows one supplied by a caller. Opening a borrowed blob only checks what is needed
//! to read the header safely; [`CompressedTracksRef::is_valid`] performs the full hash
//! and header validation.

use anim_interchange_common::allocate::BLOB_ALIGNMENT;
use anim_interchange_common::{ScratchAllocator, ScratchBuffer, TrackType};

use crate::error::EngineError;
use crate::track::calculate_duration;

pub mod blob_error;
pub mod header;

pub use blob_error::BlobError;
pub use header::{BlobHeader, BlobKind, LayoutWord, FORMAT_VERSION, HEADER_SIZE};

/// Computes the hash stored in a blob header.
///
/// `data` must hold the complete blob; the hash covers every byte after the hash field.
#[inline]
pub fn compute_hash(data: &[u8]) -> u32 {
    xxhash_rust::xxh32::xxh32(&data[header::HASHED_OFFSET..], 0)
}

/// A borrowed compressed blob.
#[derive(Debug, Clone, Copy)]
pub struct CompressedTracksRef<'a> {
    data: &'a [u8],
    header: BlobHeader,
}

impl<'a> CompressedTracksRef<'a> {
    /// Opens a blob stored at the start of `data`.
    ///
    /// # Errors
    ///
    /// - [`BlobError::TooShort`] if `data` cannot hold a header
    /// - [`BlobError::UnknownTag`] if the tag is not recognized
    /// - [`BlobError::SizeExceedsBuffer`] if the declared size is larger than `data`
    pub fn new(data: &'a [u8]) -> Result<Self, BlobError> {
        let header = BlobHeader::read(data)?;
        let size = header.size as usize;
        if size > data.len() {
            return Err(BlobError::SizeExceedsBuffer {
                size,
                len: data.len(),
            });
        }

        Ok(Self {
            data: &data[..size],
            header,
        })
    }

    /// The decoded header.
    #[inline]
    pub fn header(&self) -> &BlobHeader {
        &self.header
    }

    /// Blob shape.
    #[inline]
    pub fn kind(&self) -> BlobKind {
        self.header.kind
    }

    /// Total size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Format version the blob was written with.
    #[inline]
    pub fn version(&self) -> u8 {
        self.header.layout.version()
    }

    /// Track type, [`None`] if the stored type is unknown.
    #[inline]
    pub fn track_type(&self) -> Option<TrackType> {
        self.header.layout.track_type()
    }

    /// Number of tracks.
    #[inline]
    pub fn num_tracks(&self) -> u32 {
        self.header.num_tracks
    }

    /// Number of samples per track.
    #[inline]
    pub fn num_samples(&self) -> u32 {
        self.header.num_samples
    }

    /// Samples per second.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.header.sample_rate
    }

    /// Duration in seconds between the first and last sample.
    #[inline]
    pub fn duration(&self) -> f32 {
        calculate_duration(self.header.num_samples, self.header.sample_rate)
    }

    /// The whole blob.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// The encoded tracks following the header.
    #[inline]
    pub fn body(&self) -> &'a [u8] {
        &self.data[HEADER_SIZE.min(self.data.len())..]
    }

    /// Checks the header fields and the content hash.
    ///
    /// The body structure is checked when a decompression context is initialized.
    ///
    /// # Errors
    ///
    /// [`BlobError::InvalidHeader`] or [`BlobError::HashMismatch`].
    pub fn is_valid(&self) -> Result<(), BlobError> {
        self.header.check_sanity()?;

        let computed = compute_hash(self.data);
        if computed != self.header.hash {
            return Err(BlobError::HashMismatch {
                stored: self.header.hash,
                computed,
            });
        }
        Ok(())
    }
}

/// A compressed blob owned by the caller's scratch allocation.
#[derive(Debug)]
pub struct CompressedTracks {
    buffer: ScratchBuffer,
    header: BlobHeader,
}

impl CompressedTracks {
    /// Assembles a blob from an encoded body.
    ///
    /// Allocates `HEADER_SIZE + body.len()` bytes through `allocator`, copies the body,
    /// then writes the header with its hash.
    pub(crate) fn assemble(
        allocator: &dyn ScratchAllocator,
        kind: BlobKind,
        track_type: TrackType,
        num_tracks: u32,
        num_samples: u32,
        sample_rate: f32,
        body: &[u8],
    ) -> Result<Self, EngineError> {
        let size = HEADER_SIZE + body.len();
        let size_u32 = u32::try_from(size).map_err(|_| BlobError::TooLarge(size))?;

        let mut buffer = allocator.allocate(size, BLOB_ALIGNMENT)?;
        let data = buffer.as_mut_slice();
        data[HEADER_SIZE..].copy_from_slice(body);

        let mut header = BlobHeader {
            size: size_u32,
            hash: 0,
            kind,
            layout: LayoutWord::new(FORMAT_VERSION, track_type),
            num_tracks,
            num_samples,
            sample_rate,
            reserved: 0,
        };
        header.write(data)?;
        header.hash = compute_hash(data);
        header.write(data)?;

        Ok(Self { buffer, header })
    }

    /// Borrows the blob.
    #[inline]
    pub fn as_tracks_ref(&self) -> CompressedTracksRef<'_> {
        CompressedTracksRef {
            data: self.buffer.as_slice(),
            header: self.header,
        }
    }

    /// The whole blob.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Total size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Blob shape.
    #[inline]
    pub fn kind(&self) -> BlobKind {
        self.header.kind
    }

    /// Track type of every track.
    #[inline]
    pub fn track_type(&self) -> Option<TrackType> {
        self.header.layout.track_type()
    }

    /// Number of tracks.
    #[inline]
    pub fn num_tracks(&self) -> u32 {
        self.header.num_tracks
    }
}
