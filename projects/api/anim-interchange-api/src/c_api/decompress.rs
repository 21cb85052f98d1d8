//! C entry points of the decode path.

use anim_interchange_common::SampleRoundingPolicy;
use core::slice;

use crate::decompress::{decompress_track, decompress_tracks};
use crate::error::DecompressStatus;

/// Decode every track of a compressed blob at `sample_time`.
///
/// # Parameters
/// - `compressed`: Pointer to the compressed blob
/// - `compressed_len`: Length of the buffer holding the blob; may exceed the blob size
/// - `sample_time`: Time in seconds, clamped to the blob's duration
/// - `rounding_policy`: `0` interpolate, `1` floor, `2` ceil, `3` nearest
/// - `output`: Output buffer. Transforms take 48 bytes each and need 16 byte alignment;
///   floats take 4 bytes each and need 4 byte alignment.
/// - `output_len`: Length of `output` in bytes
///
/// # Returns
/// `0` on success or a negative [`DecompressStatus`]. Nothing is written on failure.
///
/// # Safety
/// - `compressed` must be valid for reads of `compressed_len` bytes
/// - `output` must be valid for writes of `output_len` bytes
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aix_decompress_tracks(
    compressed: *const u8,
    compressed_len: usize,
    sample_time: f32,
    rounding_policy: i32,
    output: *mut u8,
    output_len: usize,
) -> i32 {
    if compressed.is_null() || output.is_null() {
        return DecompressStatus::InvalidBuffer as i32;
    }
    let Some(policy) = SampleRoundingPolicy::from_raw(rounding_policy) else {
        return DecompressStatus::InvalidBuffer as i32;
    };

    let compressed = unsafe { slice::from_raw_parts(compressed, compressed_len) };
    let output = unsafe { slice::from_raw_parts_mut(output, output_len) };
    DecompressStatus::code_for(&decompress_tracks(compressed, sample_time, policy, output))
}

/// Decode a single track of a compressed blob at `sample_time`.
///
/// Parameters are those of [`aix_decompress_tracks`], plus `track_index`. The output only
/// needs room for one element.
///
/// # Returns
/// `0` on success or a negative [`DecompressStatus`]. Nothing is written on failure.
///
/// # Safety
/// - `compressed` must be valid for reads of `compressed_len` bytes
/// - `output` must be valid for writes of `output_len` bytes
#[unsafe(no_mangle)]
pub unsafe extern "C" fn aix_decompress_track(
    compressed: *const u8,
    compressed_len: usize,
    sample_time: f32,
    rounding_policy: i32,
    track_index: u32,
    output: *mut u8,
    output_len: usize,
) -> i32 {
    if compressed.is_null() || output.is_null() {
        return DecompressStatus::InvalidBuffer as i32;
    }
    let Some(policy) = SampleRoundingPolicy::from_raw(rounding_policy) else {
        return DecompressStatus::InvalidBuffer as i32;
    };

    let compressed = unsafe { slice::from_raw_parts(compressed, compressed_len) };
    let output = unsafe { slice::from_raw_parts_mut(output, output_len) };
    DecompressStatus::code_for(&decompress_track(
        compressed,
        sample_time,
        policy,
        track_index,
        output,
    ))
}
