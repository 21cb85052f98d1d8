#![doc = include_str!(concat!("../", core::env!("CARGO_PKG_README")))]
#![warn(missing_docs)]

/// Compressed blob format, introspection and validity checks.
pub mod blob;

/// Per channel encoding shared by the compressor and the decompression context.
pub mod codec;

/// Clip and track list compression.
pub mod compress;

/// Seek and sample decompression over a compressed blob.
pub mod decompress;

/// Errors raised by the engine.
pub mod error;

/// Error metrics used to drive compression and measure its result.
pub mod error_metric;

/// Worst case error measurement between raw and compressed tracks.
pub mod measure;

/// Rotation, translation and scale transform.
pub mod qvv;

/// Compression settings.
pub mod settings;

/// In-memory track, clip and skeleton representations.
pub mod track;

#[cfg(test)]
pub mod test_prelude;

pub use blob::{BlobError, BlobKind, CompressedTracks, CompressedTracksRef};
pub use compress::{compress_clip, compress_track_list};
pub use decompress::DecompressionContext;
pub use error::EngineError;
pub use error_metric::{QvvErrorMetric, ScalarErrorMetric};
pub use measure::{calculate_clip_error, calculate_track_list_error, TrackError};
pub use qvv::Qvvf;
pub use settings::{BlobLayout, CompressionSettings, CompressionSettingsBuilder};
pub use track::{
    AnimatedBone, AnimationClip, RigidBone, RigidSkeleton, ScalarTrack, ScalarTrackDesc,
    TrackList,
};

// Re-exported for callers that only depend on the engine.
pub use anim_interchange_common::{SampleRoundingPolicy, TrackType};
