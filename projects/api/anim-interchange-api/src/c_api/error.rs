//! C API status messages.

use core::ffi::c_char;

use crate::error::{CompressStatus, DecompressStatus};

/// Get a null-terminated description of a status returned by the `aix_compress` family.
///
/// Positive values (bytes written) are described as success. The returned string is a
/// static string literal that does not need to be freed.
///
/// # Safety
/// This function is safe to call with any status value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aix_compress_status_message(status: i32) -> *const c_char {
    if status > 0 {
        return c"Success".as_ptr();
    }
    let Some(status) = CompressStatus::from_code(status) else {
        return c"Unknown status".as_ptr();
    };
    match status {
        CompressStatus::NotSupported => c"Sample kind not supported, nothing was done".as_ptr(),
        CompressStatus::InvalidMetadataSize => {
            c"Invalid metadata size or malformed descriptor header".as_ptr()
        }
        CompressStatus::InvalidRawDataSize => {
            c"Raw data buffer is smaller than the header implies".as_ptr()
        }
        CompressStatus::CompressionFailed => c"Compression failed".as_ptr(),
        CompressStatus::BufferTooSmall => c"Buffer too small for the compressed data".as_ptr(),
        CompressStatus::IndexOutOfRange => c"Descriptor index out of range".as_ptr(),
        CompressStatus::ErrorReportFailed => c"Failed to measure the compression error".as_ptr(),
    }
}

/// Get a null-terminated description of a status returned by the `aix_decompress` family.
///
/// The returned string is a static string literal that does not need to be freed.
///
/// # Safety
/// This function is safe to call with any status value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aix_decompress_status_message(status: i32) -> *const c_char {
    let Some(status) = DecompressStatus::from_code(status) else {
        return c"Unknown status".as_ptr();
    };
    match status {
        DecompressStatus::Success => c"Success".as_ptr(),
        DecompressStatus::InvalidBuffer => c"Invalid or malformed input buffer or argument".as_ptr(),
        DecompressStatus::CorruptData => c"Corrupt or unrecognized compressed data".as_ptr(),
        DecompressStatus::BufferTooSmall => c"Output buffer too small".as_ptr(),
        DecompressStatus::MisalignedOutput => c"Output buffer misaligned".as_ptr(),
        DecompressStatus::IndexOutOfRange => c"Track index out of range".as_ptr(),
        DecompressStatus::ContextInitFailed => {
            c"Failed to initialize the decompression context".as_ptr()
        }
        DecompressStatus::UnsupportedTrackType => c"Unsupported track type".as_ptr(),
    }
}
