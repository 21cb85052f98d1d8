//! Worst case error between uncompressed tracks and their compressed blob.

use anim_interchange_common::SampleRoundingPolicy;
use tracing::debug;

use crate::blob::CompressedTracksRef;
use crate::compress::resolve_output_indices;
use crate::decompress::DecompressionContext;
use crate::error::EngineError;
use crate::error_metric::{QvvErrorMetric, ScalarErrorMetric};
use crate::qvv::Qvvf;
use crate::track::{AnimationClip, TrackList};

/// The largest error found between raw and compressed tracks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackError {
    /// Index of the input track with the largest error.
    pub index: u32,
    /// The error measured on that track.
    pub error: f32,
    /// Time in seconds at which it was measured.
    pub sample_time: f32,
}

impl TrackError {
    fn keep_worst(&mut self, index: usize, error: f32, sample_time: f32) {
        if error > self.error {
            *self = Self {
                index: index as u32,
                error,
                sample_time,
            };
        }
    }
}

/// Sample times visited by the measurement: every stored sample, clamped to the duration.
fn sample_times(num_samples: u32, sample_rate: f32, duration: f32) -> impl Iterator<Item = f32> {
    (0..num_samples).map(move |sample| (sample as f32 / sample_rate).min(duration))
}

/// Measures the worst object space error of a compressed clip against its source.
///
/// Every stored sample is decoded with [`SampleRoundingPolicy::Nearest`] and compared bone
/// by bone with [`QvvErrorMetric`]. The reported index is the bone's index in `clip`.
///
/// # Errors
///
/// The blob fails to open, or holds a different number of tracks than `clip`.
pub fn calculate_clip_error(
    clip: &AnimationClip,
    tracks: CompressedTracksRef<'_>,
) -> Result<TrackError, EngineError> {
    let mut context = DecompressionContext::initialize(tracks)?;
    let bones = clip.skeleton().bones();
    if context.num_tracks() != clip.bones().len() {
        return Err(EngineError::SkeletonMismatch {
            bones: context.num_tracks(),
            skeleton_bones: clip.bones().len(),
        });
    }
    let positions = resolve_output_indices(clip.bones().iter().map(|bone| bone.output_index))?;

    let mut raw_pose = vec![Qvvf::IDENTITY; bones.len()];
    let mut lossy_pose = vec![Qvvf::IDENTITY; bones.len()];
    let mut worst = TrackError::default();

    for (sample, sample_time) in
        sample_times(clip.num_samples(), clip.sample_rate(), clip.duration()).enumerate()
    {
        context.seek(sample_time, SampleRoundingPolicy::Nearest);
        for (bone_index, &position) in positions.iter().enumerate() {
            raw_pose[bone_index] = clip.bones()[bone_index].sample(sample);
            lossy_pose[bone_index] = context
                .sample_transform(position)
                .ok_or(EngineError::SkeletonMismatch {
                    bones: context.num_tracks(),
                    skeleton_bones: bones.len(),
                })?;
        }

        for bone_index in 0..bones.len() {
            let error = QvvErrorMetric::calculate_error(bones, &raw_pose, &lossy_pose, bone_index);
            worst.keep_worst(bone_index, error, sample_time);
        }
    }

    debug!(bone = worst.index, error = worst.error, "measured clip error");
    Ok(worst)
}

/// Measures the worst error of a compressed scalar track list against its source.
///
/// Every stored sample is decoded with [`SampleRoundingPolicy::Nearest`] and compared with
/// [`ScalarErrorMetric`]. The reported index is the track's index in `list`.
///
/// # Errors
///
/// The blob fails to open, or holds a different number of tracks than `list`.
pub fn calculate_track_list_error(
    list: &TrackList,
    tracks: CompressedTracksRef<'_>,
) -> Result<TrackError, EngineError> {
    let mut context = DecompressionContext::initialize(tracks)?;
    if context.num_tracks() != list.tracks().len() {
        return Err(EngineError::SkeletonMismatch {
            bones: context.num_tracks(),
            skeleton_bones: list.tracks().len(),
        });
    }
    let positions =
        resolve_output_indices(list.tracks().iter().map(|track| track.desc().output_index))?;

    let mut worst = TrackError::default();
    for (sample, sample_time) in
        sample_times(list.num_samples(), list.sample_rate(), list.duration()).enumerate()
    {
        context.seek(sample_time, SampleRoundingPolicy::Nearest);
        for (track_index, &position) in positions.iter().enumerate() {
            let track = &list.tracks()[track_index];
            let lossy = context
                .sample_scalar(position)
                .ok_or(EngineError::InvalidComponentCount)?;
            let raw = track.sample(sample);
            let error = ScalarErrorMetric::calculate_error(raw, &lossy.to_array()[..raw.len()]);
            worst.keep_worst(track_index, error, sample_time);
        }
    }

    debug!(track = worst.index, error = worst.error, "measured track list error");
    Ok(worst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::{compress_clip, compress_track_list};
    use crate::settings::CompressionSettings;
    use crate::test_prelude::*;
    use anim_interchange_common::AlignedAllocator;

    #[rstest]
    #[case(0.1)]
    #[case(0.01)]
    #[case(0.0001)]
    fn clip_error_stays_within_threshold(#[case] threshold: f32) {
        let clip = wave_clip(4, 20);
        let settings = CompressionSettings::builder().error_threshold(threshold).build();
        let blob = compress_clip(&clip, &settings, &AlignedAllocator).unwrap();

        let error = calculate_clip_error(&clip, blob.as_tracks_ref()).unwrap();
        assert!(error.error <= threshold, "{error:?}");
        assert!(error.index < 4);
    }

    #[test]
    fn remapped_clip_measures_against_input_order() {
        let mut clip = wave_clip(3, 10);
        clip.bone_mut(0).output_index = Some(2);
        clip.bone_mut(2).output_index = Some(0);
        let settings = CompressionSettings::builder().error_threshold(0.0).build();
        let blob = compress_clip(&clip, &settings, &AlignedAllocator).unwrap();

        let error = calculate_clip_error(&clip, blob.as_tracks_ref()).unwrap();
        assert_eq!(error.error, 0.0);
    }

    #[test]
    fn track_list_error_respects_precision() {
        let list = ramp_track_list(3, 12);
        let blob =
            compress_track_list(&list, &CompressionSettings::default(), &AlignedAllocator).unwrap();

        let error = calculate_track_list_error(&list, blob.as_tracks_ref()).unwrap();
        assert!(error.error <= 0.001, "{error:?}");
        assert!(error.sample_time <= list.duration());
    }

    #[test]
    fn track_count_mismatch_is_reported() {
        let blob = compress_track_list(
            &ramp_track_list(2, 4),
            &CompressionSettings::default(),
            &AlignedAllocator,
        )
        .unwrap();
        assert!(matches!(
            calculate_track_list_error(&ramp_track_list(3, 4), blob.as_tracks_ref()),
            Err(EngineError::SkeletonMismatch { .. })
        ));
    }
}
