//! C entry points of the encode path.
//!
//! Both functions compress in place: the raw data buffer is read completely, then
//! overwritten with the compressed blob. Blob memory comes from [`AlignedAllocator`] and is
//! released before returning.

use anim_interchange_common::AlignedAllocator;
use core::slice;

use crate::compress::{compress_in_place, compress_with_error_report};
use crate::error::CompressStatus;
use crate::settings::InterchangeSettings;

/// Compress the tracks described by `metadata`, overwriting `raw_data` with the blob.
///
/// # Parameters
/// - `metadata`: Descriptor header followed by one descriptor per track
/// - `metadata_len`: Length of `metadata` in bytes; must match the header exactly
/// - `raw_data`: Raw samples, overwritten with the compressed blob on success
/// - `raw_data_len`: Length of `raw_data` in bytes
///
/// # Returns
/// The number of bytes written to `raw_data` on success. `0` if the sample kind is not
/// supported, or a negative [`CompressStatus`] on failure.
///
/// # Safety
/// - `metadata` must be valid for reads of `metadata_len` bytes
/// - `raw_data` must be valid for reads and writes of `raw_data_len` bytes
/// - The two buffers must not overlap
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aix_compress(
    metadata: *const u8,
    metadata_len: usize,
    raw_data: *mut u8,
    raw_data_len: usize,
) -> i32 {
    if metadata.is_null() {
        return CompressStatus::InvalidMetadataSize as i32;
    }
    if raw_data.is_null() {
        return CompressStatus::InvalidRawDataSize as i32;
    }

    let metadata = unsafe { slice::from_raw_parts(metadata, metadata_len) };
    let raw_data = unsafe { slice::from_raw_parts_mut(raw_data, raw_data_len) };

    CompressStatus::code_for(&compress_in_place(
        metadata,
        raw_data,
        &InterchangeSettings::default(),
        &AlignedAllocator,
    ))
}

/// Like [`aix_compress`], then measures the blob and writes the worst case error into
/// `metadata`.
///
/// On success the first 24 bytes of `metadata` hold three doubles: the input index of the
/// track with the largest error, that error, and the sample time it was measured at.
///
/// # Returns
/// Same as [`aix_compress`], plus [`CompressStatus::ErrorReportFailed`] if the blob could
/// not be measured.
///
/// # Safety
/// - `metadata` must be valid for reads and writes of `metadata_len` bytes
/// - `raw_data` must be valid for reads and writes of `raw_data_len` bytes
/// - The two buffers must not overlap
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aix_compress_with_error(
    metadata: *mut u8,
    metadata_len: usize,
    raw_data: *mut u8,
    raw_data_len: usize,
) -> i32 {
    if metadata.is_null() {
        return CompressStatus::InvalidMetadataSize as i32;
    }
    if raw_data.is_null() {
        return CompressStatus::InvalidRawDataSize as i32;
    }

    let metadata = unsafe { slice::from_raw_parts_mut(metadata, metadata_len) };
    let raw_data = unsafe { slice::from_raw_parts_mut(raw_data, raw_data_len) };

    let result = compress_with_error_report(
        metadata,
        raw_data,
        &InterchangeSettings::default(),
        &AlignedAllocator,
    );
    CompressStatus::code_for(&result.map(|report| report.bytes_written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompress::validate_blob;
    use crate::descriptor::ErrorRecord;
    use crate::test_prelude::*;
    use core::ptr;

    #[test]
    fn null_pointers_are_rejected() {
        let metadata = scalar_metadata(2, 30.0, &[(-1.0, 0.1)]);
        let mut raw = f64_bytes(&[0.0, 1.0]);
        unsafe {
            assert_eq!(aix_compress(ptr::null(), 0, raw.as_mut_ptr(), raw.len()), -1);
            assert_eq!(
                aix_compress(metadata.as_ptr(), metadata.len(), ptr::null_mut(), 0),
                -2
            );
        }
    }

    #[test]
    fn compress_returns_bytes_written() {
        let metadata = scalar_metadata(8, 30.0, &[(-1.0, 0.01)]);
        let mut raw = f64_bytes(&[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]);
        raw.resize(1024, 0);

        let written = unsafe {
            aix_compress(metadata.as_ptr(), metadata.len(), raw.as_mut_ptr(), raw.len())
        };
        assert!(written > 0);
        assert!(validate_blob(&raw[..written as usize]).is_ok());
    }

    #[test]
    fn compress_with_error_writes_record() {
        let mut metadata = scalar_metadata(8, 30.0, &[(-1.0, 0.01)]);
        let mut raw = f64_bytes(&[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]);
        raw.resize(1024, 0);

        let written = unsafe {
            aix_compress_with_error(
                metadata.as_mut_ptr(),
                metadata.len(),
                raw.as_mut_ptr(),
                raw.len(),
            )
        };
        assert!(written > 0);
        let record = ErrorRecord::read_from(&metadata).unwrap();
        assert_eq!(record.track_index, 0.0);
        assert!(record.measured_error <= 0.01);
    }
}
