//! Error types for interchange operations and their stable status codes.
//!
//! Every failure is an [`InterchangeError`]. Hosts without an exception model receive a
//! status code instead; the encode and decode entry points each have their own code
//! family ([`CompressStatus`] and [`DecompressStatus`]), since the same negative value
//! means different things in each.

use anim_interchange_common::TrackType;
use anim_interchange_engine::{BlobError, EngineError};
use thiserror::Error;

/// Errors that can occur while marshalling tracks across the buffer boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterchangeError {
    /// The header declares a sample kind this layer does not handle.
    ///
    /// Reported as a benign "not supported" status rather than a failure.
    #[error("Unsupported sample kind {0}")]
    UnsupportedSampleKind(f64),

    /// The metadata buffer does not have the size implied by its header.
    #[error("Invalid metadata size: expected {expected} bytes, got {actual}")]
    InvalidMetadataSize {
        /// Size implied by the header
        expected: usize,
        /// Size supplied
        actual: usize,
    },

    /// A header or descriptor field holds a value that cannot describe tracks.
    #[error("Malformed descriptor: {0}")]
    MalformedDescriptor(&'static str),

    /// The raw sample buffer is smaller than the header implies.
    #[error("Invalid raw data size: need at least {expected} bytes, got {actual}")]
    InvalidRawDataSize {
        /// Size implied by the header
        expected: usize,
        /// Size supplied
        actual: usize,
    },

    /// The engine rejected the tracks.
    #[error("Compression failed: {0}")]
    CompressionFailed(#[source] EngineError),

    /// An output buffer cannot hold the result.
    #[error("Buffer too small: need {needed} bytes, but only {actual} bytes available")]
    BufferTooSmall {
        /// The required size in bytes
        needed: usize,
        /// The actual size in bytes
        actual: usize,
    },

    /// A descriptor or requested index is not below the track count.
    #[error("Index {index} out of range for {count} tracks")]
    IndexOutOfRange {
        /// The offending index
        index: u64,
        /// Number of tracks
        count: u32,
    },

    /// The freshly compressed blob could not be measured.
    #[error("Failed to measure the compression error: {0}")]
    ErrorReportFailed(#[source] EngineError),

    /// An input buffer or argument is invalid.
    #[error("Invalid buffer or argument: {0}")]
    InvalidBuffer(&'static str),

    /// The compressed blob is corrupt or of an unknown shape.
    #[error("Corrupt compressed data: {0}")]
    CorruptData(#[source] BlobError),

    /// The output buffer does not satisfy the alignment of its elements.
    #[error("Output buffer is not aligned to {alignment} bytes")]
    MisalignedOutput {
        /// Required alignment in bytes
        alignment: usize,
    },

    /// A decompression context could not be opened over the blob.
    #[error("Failed to initialize decompression: {0}")]
    ContextInitFailed(#[source] EngineError),

    /// The blob holds tracks of a type this layer does not decode.
    #[error("Unsupported track type {0:?}")]
    UnsupportedTrackType(TrackType),
}

/// Status codes returned by the encode entry points.
///
/// Success is reported as the positive number of bytes written, never as a variant.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressStatus {
    /// Nothing was done; the sample kind is not supported.
    NotSupported = 0,
    /// Metadata size does not match its header, or the header is malformed.
    InvalidMetadataSize = -1,
    /// Raw sample buffer is smaller than the header implies.
    InvalidRawDataSize = -2,
    /// The engine rejected the tracks.
    CompressionFailed = -3,
    /// The compressed blob does not fit the output buffer.
    BufferTooSmall = -4,
    /// A descriptor index is not below the track count.
    IndexOutOfRange = -5,
    /// The compression error could not be measured.
    ErrorReportFailed = -6,
}

/// Status codes returned by the decode entry points.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecompressStatus {
    /// Operation succeeded
    Success = 0,
    /// Invalid or malformed input buffer or argument
    InvalidBuffer = -1,
    /// Corrupt or unrecognized compressed data
    CorruptData = -2,
    /// Output buffer too small for the requested content
    BufferTooSmall = -3,
    /// Output buffer not aligned for its elements
    MisalignedOutput = -4,
    /// Track index out of range
    IndexOutOfRange = -5,
    /// Decompression context failed to initialize
    ContextInitFailed = -6,
    /// Unsupported track type
    UnsupportedTrackType = -10,
}

impl From<&InterchangeError> for CompressStatus {
    fn from(error: &InterchangeError) -> Self {
        match error {
            InterchangeError::UnsupportedSampleKind(_) => Self::NotSupported,
            InterchangeError::InvalidMetadataSize { .. }
            | InterchangeError::MalformedDescriptor(_) => Self::InvalidMetadataSize,
            InterchangeError::InvalidRawDataSize { .. } => Self::InvalidRawDataSize,
            InterchangeError::BufferTooSmall { .. } => Self::BufferTooSmall,
            InterchangeError::IndexOutOfRange { .. } => Self::IndexOutOfRange,
            InterchangeError::ErrorReportFailed(_) | InterchangeError::ContextInitFailed(_) => {
                Self::ErrorReportFailed
            }
            InterchangeError::CompressionFailed(_)
            | InterchangeError::InvalidBuffer(_)
            | InterchangeError::CorruptData(_)
            | InterchangeError::MisalignedOutput { .. }
            | InterchangeError::UnsupportedTrackType(_) => Self::CompressionFailed,
        }
    }
}

impl From<&InterchangeError> for DecompressStatus {
    fn from(error: &InterchangeError) -> Self {
        match error {
            InterchangeError::InvalidBuffer(_)
            | InterchangeError::UnsupportedSampleKind(_)
            | InterchangeError::InvalidMetadataSize { .. }
            | InterchangeError::MalformedDescriptor(_)
            | InterchangeError::InvalidRawDataSize { .. } => Self::InvalidBuffer,
            InterchangeError::CorruptData(_) | InterchangeError::CompressionFailed(_) => {
                Self::CorruptData
            }
            InterchangeError::BufferTooSmall { .. } => Self::BufferTooSmall,
            InterchangeError::MisalignedOutput { .. } => Self::MisalignedOutput,
            InterchangeError::IndexOutOfRange { .. } => Self::IndexOutOfRange,
            InterchangeError::ContextInitFailed(_) | InterchangeError::ErrorReportFailed(_) => {
                Self::ContextInitFailed
            }
            InterchangeError::UnsupportedTrackType(_) => Self::UnsupportedTrackType,
        }
    }
}

impl CompressStatus {
    /// Maps an encode result onto the host status: bytes written, or a status code.
    pub fn code_for(result: &Result<usize, InterchangeError>) -> i32 {
        match result {
            Ok(bytes_written) => i32::try_from(*bytes_written)
                .unwrap_or(Self::CompressionFailed as i32),
            Err(error) => Self::from(error) as i32,
        }
    }

    /// Converts a raw status code back into a variant.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::NotSupported),
            -1 => Some(Self::InvalidMetadataSize),
            -2 => Some(Self::InvalidRawDataSize),
            -3 => Some(Self::CompressionFailed),
            -4 => Some(Self::BufferTooSmall),
            -5 => Some(Self::IndexOutOfRange),
            -6 => Some(Self::ErrorReportFailed),
            _ => None,
        }
    }

    /// A static description of the status.
    pub fn message(self) -> &'static str {
        match self {
            Self::NotSupported => "Sample kind not supported, nothing was done",
            Self::InvalidMetadataSize => "Invalid metadata size or malformed descriptor header",
            Self::InvalidRawDataSize => "Raw data buffer is smaller than the header implies",
            Self::CompressionFailed => "Compression failed",
            Self::BufferTooSmall => "Buffer too small for the compressed data",
            Self::IndexOutOfRange => "Descriptor index out of range",
            Self::ErrorReportFailed => "Failed to measure the compression error",
        }
    }
}

impl DecompressStatus {
    /// Maps a decode result onto the host status.
    pub fn code_for(result: &Result<(), InterchangeError>) -> i32 {
        match result {
            Ok(()) => Self::Success as i32,
            Err(error) => Self::from(error) as i32,
        }
    }

    /// Converts a raw status code back into a variant.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            -1 => Some(Self::InvalidBuffer),
            -2 => Some(Self::CorruptData),
            -3 => Some(Self::BufferTooSmall),
            -4 => Some(Self::MisalignedOutput),
            -5 => Some(Self::IndexOutOfRange),
            -6 => Some(Self::ContextInitFailed),
            -10 => Some(Self::UnsupportedTrackType),
            _ => None,
        }
    }

    /// A static description of the status.
    pub fn message(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InvalidBuffer => "Invalid or malformed input buffer or argument",
            Self::CorruptData => "Corrupt or unrecognized compressed data",
            Self::BufferTooSmall => "Output buffer too small",
            Self::MisalignedOutput => "Output buffer misaligned",
            Self::IndexOutOfRange => "Track index out of range",
            Self::ContextInitFailed => "Failed to initialize the decompression context",
            Self::UnsupportedTrackType => "Unsupported track type",
        }
    }
}
