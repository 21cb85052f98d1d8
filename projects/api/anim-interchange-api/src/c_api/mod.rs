//! # C API (FFI) Documentation
//!
//! *Note: The C API is only available when the `c-exports` feature is enabled.*
//!
//! The `c-exports` feature exports the encode and decode entry points for hosts that only
//! deal in raw buffers. Every function returns a plain `int32_t` status; see
//! [`CompressStatus`] and [`DecompressStatus`] for the values.
//!
//! ## Example Usage
//!
//! ### Compress Two Scalar Tracks
//!
//! ```c
//! // Header: track count, sample kind (1 = scalar), samples per track, sample rate.
//! double metadata[4 + 2 * 2] = { 2.0, 1.0, 4.0, 30.0,
//!                                -1.0, 0.001,    // track 0: no remap, precision
//!                                -1.0, 0.001 };  // track 1
//! double raw[2 * 4] = { 0.0, 1.0, 2.0, 3.0,
//!                       5.0, 5.0, 5.0, 5.0 };
//!
//! int32_t written = aix_compress((const uint8_t*)metadata, sizeof(metadata),
//!                                (uint8_t*)raw, sizeof(raw));
//! if (written < 0) {
//!     printf("%s\n", aix_compress_status_message(written));
//! }
//! // On success the first `written` bytes of `raw` hold the compressed blob.
//! ```
//!
//! ### Decompress a Pose
//!
//! ```c
//! float values[2];
//! int32_t status = aix_decompress_tracks((const uint8_t*)raw, written,
//!                                        1.0f / 30.0f, 3 /* nearest */,
//!                                        (uint8_t*)values, sizeof(values));
//! if (status != 0) {
//!     printf("%s\n", aix_decompress_status_message(status));
//! }
//! ```
//!
//! ## Buffer Contracts
//!
//! - All fields are host-native doubles or floats; no byte swapping takes place.
//! - Transform outputs are 48 byte elements and must be 16 byte aligned.
//! - Nothing is written to an output buffer when a call fails.
//!
//! [`CompressStatus`]: crate::CompressStatus
//! [`DecompressStatus`]: crate::DecompressStatus

pub mod compress;
pub mod decompress;
pub mod error;
