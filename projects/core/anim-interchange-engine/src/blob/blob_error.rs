use thiserror::Error;

/// Errors raised while opening, validating or assembling a compressed blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    /// The buffer cannot hold the fixed size blob header.
    #[error("Buffer of {len} bytes is too short to hold a blob header")]
    TooShort {
        /// Length of the supplied buffer
        len: usize,
    },

    /// The header tag is not one of the known blob shapes.
    #[error("Unrecognized blob tag {0:#010X}")]
    UnknownTag(u32),

    /// The blob claims to be larger than the buffer holding it.
    #[error("Blob declares {size} bytes but the buffer holds only {len}")]
    SizeExceedsBuffer {
        /// Size declared in the header
        size: usize,
        /// Length of the supplied buffer
        len: usize,
    },

    /// The stored hash does not match the blob contents.
    #[error("Blob hash mismatch: stored {stored:#010X}, computed {computed:#010X}")]
    HashMismatch {
        /// Hash stored in the header
        stored: u32,
        /// Hash computed over the blob
        computed: u32,
    },

    /// A header field holds a value no valid blob can have.
    #[error("Invalid blob header: {0}")]
    InvalidHeader(&'static str),

    /// The blob was written by an unsupported format version.
    #[error("Unsupported blob version {0}")]
    UnsupportedVersion(u8),

    /// The body does not match what the header describes.
    #[error("Malformed blob body: {0}")]
    MalformedBody(&'static str),

    /// The assembled blob would not fit its 32-bit size field.
    #[error("Blob of {0} bytes exceeds the maximum blob size")]
    TooLarge(usize),
}
