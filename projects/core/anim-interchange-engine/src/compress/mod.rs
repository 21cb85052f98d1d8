//! # Compression
//!
//! Turns an [`AnimationClip`](crate::AnimationClip) or a [`TrackList`](crate::TrackList)
//! into a [`CompressedTracks`](crate::CompressedTracks) blob allocated through the caller's
//! [`ScratchAllocator`](anim_interchange_common::ScratchAllocator).
//!
//! Both paths detect constant channels first, then pick the lowest bit rate meeting the
//! error budget. Transform tracks are judged in object space through the hierarchy,
//! scalar tracks against their own precision.

use crate::error::EngineError;

pub mod clip;
pub mod track_list;

pub use clip::compress_clip;
pub use track_list::compress_track_list;

/// Checks that a sample rate can describe a clip.
pub(crate) fn validate_sample_rate(sample_rate: f32) -> Result<(), EngineError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidSampleRate(sample_rate))
    }
}

/// Resolves each track's position in the compressed output.
///
/// [`None`] keeps a track at its own index. The result maps track index to output
/// position and is guaranteed to be a permutation of `0..num_tracks`.
///
/// # Errors
///
/// [`EngineError::InvalidOutputIndex`] for an out of range or repeated position.
pub(crate) fn resolve_output_indices(
    output_indices: impl ExactSizeIterator<Item = Option<u32>>,
) -> Result<Vec<usize>, EngineError> {
    let num_tracks = output_indices.len();
    let mut taken = vec![false; num_tracks];
    let mut positions = Vec::with_capacity(num_tracks);

    for (track, output_index) in output_indices.enumerate() {
        let position = output_index.map_or(track, |index| index as usize);
        if position >= num_tracks || taken[position] {
            return Err(EngineError::InvalidOutputIndex {
                track,
                output_index: position as u32,
            });
        }
        taken[position] = true;
        positions.push(position);
    }
    Ok(positions)
}

/// Inverts a track-to-output mapping into output-to-track order.
pub(crate) fn output_order(positions: &[usize]) -> Vec<usize> {
    let mut order = vec![0; positions.len()];
    for (track, &position) in positions.iter().enumerate() {
        order[position] = track;
    }
    order
}
