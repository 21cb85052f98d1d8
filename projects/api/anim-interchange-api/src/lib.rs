#![doc = include_str!("../README.MD")]
#![warn(missing_docs)]

//! Buffer interchange layer between flat host buffers and the compression engine.
//!
//! # Examples
//!
//! ## Round Trip a Scalar Track
//!
//! ```
//! use anim_interchange_api::{compress_into, decompress_track, InterchangeSettings};
//! use anim_interchange_common::{AlignedAllocator, SampleRoundingPolicy};
//!
//! let f64_bytes = |values: &[f64]| -> Vec<u8> {
//!     values.iter().flat_map(|value| value.to_ne_bytes()).collect()
//! };
//! // 1 scalar track, 3 samples at 30Hz, no remap, precision 0.001.
//! let metadata = f64_bytes(&[1.0, 1.0, 3.0, 30.0, -1.0, 0.001]);
//! let raw_data = f64_bytes(&[0.0, 0.5, 1.0]);
//!
//! let mut blob = vec![0u8; 1024];
//! let size = compress_into(
//!     &metadata,
//!     &raw_data,
//!     &mut blob,
//!     &InterchangeSettings::default(),
//!     &AlignedAllocator,
//! )
//! .unwrap();
//!
//! let mut value = [0.0f32; 1];
//! // SAFETY: Viewing a float as its bytes.
//! let output = unsafe { core::slice::from_raw_parts_mut(value.as_mut_ptr().cast::<u8>(), 4) };
//! decompress_track(&blob[..size], 1.0 / 30.0, SampleRoundingPolicy::Nearest, 0, output)
//!     .unwrap();
//! assert!((value[0] - 0.5).abs() <= 0.001);
//! ```

/// Track/Skeleton Builder.
pub mod builder;

/// Compression Dispatcher.
pub mod compress;

/// Decompression Dispatcher.
pub mod decompress;

/// Binary Descriptor Reader.
pub mod descriptor;

/// Errors and status codes.
pub mod error;

/// Encode path settings.
pub mod settings;

/// Output sinks for decoded values.
pub mod sink;

#[cfg(feature = "c-exports")]
pub mod c_api;

#[cfg(test)]
pub mod test_prelude;

pub use compress::{compress_in_place, compress_into, compress_with_error_report, CompressReport};
pub use decompress::{decompress_track, decompress_tracks, validate_blob};
pub use descriptor::{
    DescriptorHeader, ErrorRecord, SampleKind, ScalarTrackDescriptor, TrackDescriptors,
    TransformTrackDescriptor,
};
pub use error::{CompressStatus, DecompressStatus, InterchangeError};
pub use settings::{InterchangeSettings, InterchangeSettingsBuilder};
pub use sink::DecodeRequest;

// Re-exported so callers can configure the blob shape without depending on the engine.
pub use anim_interchange_engine::BlobLayout;
