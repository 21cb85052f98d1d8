//! Scalar track list compression.

use anim_interchange_common::{ScratchAllocator, TrackType};
use tracing::debug;

use super::{output_order, resolve_output_indices, validate_sample_rate};
use crate::blob::{BlobKind, CompressedTracks};
use crate::codec::{
    encode_channel, reconstruct_channel, ChannelFormat, MAX_BIT_RATE, MIN_BIT_RATE,
    RAW_BIT_RATE,
};
use crate::error::EngineError;
use crate::error_metric::ScalarErrorMetric;
use crate::settings::{BlobLayout, CompressionSettings};
use crate::track::{ScalarTrack, TrackList};

const SCALAR_DEFAULTS: [f32; 4] = [0.0; 4];

/// Compresses a list of scalar tracks.
///
/// Each track is judged against its own precision: tracks whose samples all lie within
/// the precision of the first sample are stored as constants, every other track uses the
/// lowest bit rate meeting the precision, falling back to raw samples. Only
/// [`CompressionSettings::layout`] is read from `settings`.
///
/// # Errors
///
/// Any [`EngineError`] describing invalid input, or an allocation failure.
pub fn compress_track_list(
    list: &TrackList,
    settings: &CompressionSettings,
    allocator: &dyn ScratchAllocator,
) -> Result<CompressedTracks, EngineError> {
    let (positions, num_components) = validate_track_list(list, settings.layout)?;
    let track_type = TrackType::scalar_with_components(num_components)
        .ok_or(EngineError::InvalidComponentCount)?;

    let mut body = Vec::new();
    for track_index in output_order(&positions) {
        let track = &list.tracks()[track_index];
        let format = select_format(track);
        encode_channel(format, track.values(), num_components, &mut body);
    }

    let kind = match settings.layout {
        BlobLayout::Legacy => BlobKind::LegacyTrackList,
        BlobLayout::TrackList => BlobKind::TrackList,
    };
    debug!(
        tracks = list.tracks().len(),
        samples = list.num_samples(),
        body_bytes = body.len(),
        ?kind,
        ?track_type,
        "compressed scalar track list"
    );

    CompressedTracks::assemble(
        allocator,
        kind,
        track_type,
        list.tracks().len() as u32,
        list.num_samples(),
        list.sample_rate(),
        &body,
    )
}

/// Validates the list, returning each track's output position and the shared component count.
fn validate_track_list(
    list: &TrackList,
    layout: BlobLayout,
) -> Result<(Vec<usize>, usize), EngineError> {
    let tracks = list.tracks();
    let first = tracks.first().ok_or(EngineError::EmptyTrackList)?;
    if list.num_samples() == 0 {
        return Err(EngineError::NoSamples);
    }
    validate_sample_rate(list.sample_rate())?;
    if tracks.len() > u32::MAX as usize {
        return Err(EngineError::TooManyTracks {
            count: tracks.len(),
            max: u32::MAX as usize,
        });
    }

    let num_components = first.num_components();
    let max_components = match layout {
        BlobLayout::Legacy => 1,
        BlobLayout::TrackList => 4,
    };
    if !(1..=max_components).contains(&num_components)
        || tracks.iter().any(|track| track.num_components() != num_components)
    {
        return Err(EngineError::InvalidComponentCount);
    }

    let num_samples = list.num_samples() as usize;
    for (track_index, track) in tracks.iter().enumerate() {
        if track.values().len() != num_samples * num_components {
            return Err(EngineError::SampleCountMismatch {
                track: track_index,
                expected: num_samples,
                actual: track.num_samples(),
            });
        }
        let precision = track.desc().precision;
        if !precision.is_finite() || precision < 0.0 {
            return Err(EngineError::InvalidSettings("precision"));
        }
        if let Some(position) = track.values().iter().position(|value| !value.is_finite()) {
            return Err(EngineError::NonFiniteSample {
                track: track_index,
                sample: position / num_components,
            });
        }
    }

    let positions = resolve_output_indices(tracks.iter().map(|track| track.desc().output_index))?;
    Ok((positions, num_components))
}

/// Picks the cheapest storage that keeps the track within its precision.
fn select_format(track: &ScalarTrack) -> ChannelFormat {
    let num_components = track.num_components();
    let values = track.values();
    let precision = track.desc().precision;
    let defaults = &SCALAR_DEFAULTS[..num_components];

    let mut lossy = Vec::with_capacity(values.len());
    let meets_precision = |format: ChannelFormat, lossy: &mut Vec<f32>| {
        reconstruct_channel(format, values, num_components, defaults, lossy);
        ScalarErrorMetric::calculate_error(values, lossy) <= precision
    };

    if meets_precision(ChannelFormat::Constant, &mut lossy) {
        return ChannelFormat::Constant;
    }
    (MIN_BIT_RATE..=MAX_BIT_RATE)
        .map(|bit_rate| ChannelFormat::Animated { bit_rate })
        .find(|&format| meets_precision(format, &mut lossy))
        .unwrap_or(ChannelFormat::Animated {
            bit_rate: RAW_BIT_RATE,
        })
}
