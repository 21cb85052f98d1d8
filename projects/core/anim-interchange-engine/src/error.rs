//! Error types for compression and decompression operations.

use crate::blob::BlobError;
use anim_interchange_common::AllocateError;
use thiserror::Error;

/// Errors that can occur while compressing tracks or opening a decompression context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The clip or track list holds no tracks.
    #[error("Track list is empty")]
    EmptyTrackList,

    /// The tracks hold no samples.
    #[error("Tracks have no samples")]
    NoSamples,

    /// The sample rate is not a finite, positive number.
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    /// More tracks than the requested blob layout can address.
    #[error("Too many tracks: {count}, the blob layout supports at most {max}")]
    TooManyTracks {
        /// Number of tracks supplied
        count: usize,
        /// Maximum supported by the layout
        max: usize,
    },

    /// A bone's parent does not precede it in the skeleton.
    #[error("Bone {bone} has invalid parent {parent}; parents must precede their children")]
    InvalidParent {
        /// Index of the bone
        bone: usize,
        /// Index of its declared parent
        parent: u32,
    },

    /// Output indices do not form a permutation of the track indices.
    #[error("Track {track} has invalid or duplicate output index {output_index}")]
    InvalidOutputIndex {
        /// Index of the track
        track: usize,
        /// Its resolved output index
        output_index: u32,
    },

    /// The number of animated bones does not match the skeleton.
    #[error("Clip has {bones} animated bones but the skeleton has {skeleton_bones}")]
    SkeletonMismatch {
        /// Number of animated bones
        bones: usize,
        /// Number of skeleton bones
        skeleton_bones: usize,
    },

    /// A track does not hold exactly one value per sample.
    #[error("Track {track} holds {actual} samples, expected {expected}")]
    SampleCountMismatch {
        /// Index of the track
        track: usize,
        /// Sample count of the clip or list
        expected: usize,
        /// Sample count of the track
        actual: usize,
    },

    /// A sample holds a NaN or infinite component.
    #[error("Track {track} has a non-finite value at sample {sample}")]
    NonFiniteSample {
        /// Index of the track
        track: usize,
        /// Index of the sample
        sample: usize,
    },

    /// Scalar tracks of one list must share a component count of 1 to 4.
    #[error("Scalar tracks must share a component count between 1 and 4")]
    InvalidComponentCount,

    /// A compression setting is out of range.
    #[error("Invalid compression setting: {0}")]
    InvalidSettings(&'static str),

    /// Scratch memory for the blob could not be allocated.
    #[error("Failed to allocate the compressed blob: {0}")]
    Allocate(#[from] AllocateError),

    /// The blob could not be produced or opened.
    #[error(transparent)]
    Blob(#[from] BlobError),
}
