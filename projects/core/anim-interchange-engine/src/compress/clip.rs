//! Transform clip compression.

use anim_interchange_common::{ScratchAllocator, TrackType};
use glam::{Quat, Vec3};
use tracing::debug;

use super::{output_order, resolve_output_indices, validate_sample_rate};
use crate::blob::{BlobKind, CompressedTracks};
use crate::codec::{
    encode_channel, next_bit_rate, reconstruct_channel, ChannelFormat, MIN_BIT_RATE,
    RAW_BIT_RATE,
};
use crate::error::EngineError;
use crate::error_metric::QvvErrorMetric;
use crate::qvv::Qvvf;
use crate::settings::{BlobLayout, CompressionSettings};
use crate::track::{AnimatedBone, AnimationClip, RigidBone};

/// Components of the rotation, translation and scale channels.
pub(crate) const CHANNEL_COMPONENTS: [usize; 3] = [4, 3, 3];

/// Values of the rotation, translation and scale channels when stored as default.
pub(crate) const CHANNEL_DEFAULTS: [[f32; 4]; 3] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 0.0],
];

const ROTATION: usize = 0;
const TRANSLATION: usize = 1;
const SCALE: usize = 2;

/// Compresses a transform clip.
///
/// Channels within the constant thresholds of the settings are stored once (or not at all
/// when they match the identity). Animated channels start at the lowest bit rate; while a
/// bone's worst object space error exceeds [`CompressionSettings::error_threshold`] the bit
/// rate of that bone, or of its nearest ancestor that can still be refined, is raised.
///
/// # Errors
///
/// Any [`EngineError`] describing invalid input, or an allocation failure.
pub fn compress_clip(
    clip: &AnimationClip,
    settings: &CompressionSettings,
    allocator: &dyn ScratchAllocator,
) -> Result<CompressedTracks, EngineError> {
    settings.validate()?;
    let positions = validate_clip(clip, settings.layout)?;

    let num_samples = clip.num_samples() as usize;
    let bones = clip.skeleton().bones();
    let mut channels: Vec<BoneChannels> = clip
        .bones()
        .iter()
        .map(|bone| BoneChannels::new(bone, settings))
        .collect();

    optimize_bit_rates(clip, &mut channels, settings.error_threshold);

    let mut body = Vec::new();
    for bone_index in output_order(&positions) {
        channels[bone_index].encode_into(&mut body);
    }

    let kind = match settings.layout {
        BlobLayout::Legacy => BlobKind::LegacyClip,
        BlobLayout::TrackList => BlobKind::TrackList,
    };
    debug!(
        bones = bones.len(),
        samples = num_samples,
        body_bytes = body.len(),
        ?kind,
        "compressed transform clip"
    );

    CompressedTracks::assemble(
        allocator,
        kind,
        TrackType::Qvvf,
        bones.len() as u32,
        clip.num_samples(),
        clip.sample_rate(),
        &body,
    )
}

/// Validates the clip and resolves each bone's output position.
fn validate_clip(clip: &AnimationClip, layout: BlobLayout) -> Result<Vec<usize>, EngineError> {
    let skeleton_bones = clip.skeleton().bones();
    let bones = clip.bones();
    if bones.is_empty() {
        return Err(EngineError::EmptyTrackList);
    }
    if clip.num_samples() == 0 {
        return Err(EngineError::NoSamples);
    }
    validate_sample_rate(clip.sample_rate())?;

    if bones.len() != skeleton_bones.len() {
        return Err(EngineError::SkeletonMismatch {
            bones: bones.len(),
            skeleton_bones: skeleton_bones.len(),
        });
    }
    let max_tracks = match layout {
        BlobLayout::Legacy => u16::MAX as usize,
        BlobLayout::TrackList => u32::MAX as usize,
    };
    if bones.len() > max_tracks {
        return Err(EngineError::TooManyTracks {
            count: bones.len(),
            max: max_tracks,
        });
    }

    for (bone_index, bone) in skeleton_bones.iter().enumerate() {
        validate_rigid_bone(bone_index, bone)?;
    }

    let num_samples = clip.num_samples() as usize;
    for (track, bone) in bones.iter().enumerate() {
        for actual in [bone.rotations.len(), bone.translations.len(), bone.scales.len()] {
            if actual != num_samples {
                return Err(EngineError::SampleCountMismatch {
                    track,
                    expected: num_samples,
                    actual,
                });
            }
        }
        if let Some(sample) = (0..num_samples).find(|&sample| !bone.sample(sample).is_finite()) {
            return Err(EngineError::NonFiniteSample { track, sample });
        }
    }

    resolve_output_indices(bones.iter().map(|bone| bone.output_index))
}

fn validate_rigid_bone(bone_index: usize, bone: &RigidBone) -> Result<(), EngineError> {
    if let Some(parent) = bone.parent_index {
        if parent as usize >= bone_index {
            return Err(EngineError::InvalidParent {
                bone: bone_index,
                parent,
            });
        }
    }
    if !bone.vertex_distance.is_finite() || bone.vertex_distance < 0.0 {
        return Err(EngineError::InvalidSettings("vertex_distance"));
    }
    Ok(())
}

/// Angle in radians between two rotations.
#[inline]
fn rotation_angle(a: Quat, b: Quat) -> f32 {
    2.0 * a.dot(b).abs().min(1.0).acos()
}

/// Picks the storage of one channel from its samples.
fn classify<T: Copy>(
    samples: &[T],
    default: T,
    distance: impl Fn(T, T) -> f32,
    threshold: f32,
) -> ChannelFormat {
    if samples.iter().all(|&sample| distance(sample, default) <= threshold) {
        ChannelFormat::Default
    } else if samples.iter().all(|&sample| distance(sample, samples[0]) <= threshold) {
        ChannelFormat::Constant
    } else {
        ChannelFormat::Animated {
            bit_rate: MIN_BIT_RATE,
        }
    }
}

/// Encoding state of the three channels of one bone.
struct BoneChannels {
    formats: [ChannelFormat; 3],
    samples: [Vec<f32>; 3],
    lossy: [Vec<f32>; 3],
}

impl BoneChannels {
    fn new(bone: &AnimatedBone, settings: &CompressionSettings) -> Self {
        let rotation_format = classify(
            &bone.rotations,
            Quat::IDENTITY,
            rotation_angle,
            settings.constant_rotation_threshold_angle,
        );
        let translation_format = classify(
            &bone.translations,
            Vec3::ZERO,
            Vec3::distance,
            settings.constant_translation_threshold,
        );
        let scale_format = classify(
            &bone.scales,
            Vec3::ONE,
            Vec3::distance,
            settings.constant_scale_threshold,
        );

        // Animated rotations live in the w >= 0 hemisphere so their range stays tight.
        let flip_sign = matches!(rotation_format, ChannelFormat::Animated { .. });
        let rotations = bone
            .rotations
            .iter()
            .flat_map(|&rotation| {
                let rotation = if flip_sign && rotation.w < 0.0 {
                    -rotation
                } else {
                    rotation
                };
                rotation.to_array()
            })
            .collect();
        let translations = bone.translations.iter().flat_map(|t| t.to_array()).collect();
        let scales = bone.scales.iter().flat_map(|s| s.to_array()).collect();

        let mut channels = Self {
            formats: [rotation_format, translation_format, scale_format],
            samples: [rotations, translations, scales],
            lossy: [Vec::new(), Vec::new(), Vec::new()],
        };
        for channel in [ROTATION, TRANSLATION, SCALE] {
            channels.refresh_lossy(channel);
        }
        channels
    }

    fn refresh_lossy(&mut self, channel: usize) {
        let num_components = CHANNEL_COMPONENTS[channel];
        reconstruct_channel(
            self.formats[channel],
            &self.samples[channel],
            num_components,
            &CHANNEL_DEFAULTS[channel][..num_components],
            &mut self.lossy[channel],
        );

        if channel == ROTATION && self.formats[ROTATION].is_quantized() {
            for rotation in self.lossy[ROTATION].chunks_exact_mut(4) {
                let normalized = Quat::from_slice(rotation).normalize();
                rotation.copy_from_slice(&normalized.to_array());
            }
        }
    }

    fn can_increase_bit_rate(&self) -> bool {
        self.formats.iter().any(|format| format.is_quantized())
    }

    fn increase_bit_rate(&mut self) {
        for channel in [ROTATION, TRANSLATION, SCALE] {
            if let ChannelFormat::Animated { bit_rate } = self.formats[channel] {
                if let Some(bit_rate) = next_bit_rate(bit_rate) {
                    self.formats[channel] = ChannelFormat::Animated { bit_rate };
                    self.refresh_lossy(channel);
                }
            }
        }
    }

    fn lossy_sample(&self, sample_index: usize) -> Qvvf {
        let rotation = &self.lossy[ROTATION][sample_index * 4..sample_index * 4 + 4];
        let translation = &self.lossy[TRANSLATION][sample_index * 3..sample_index * 3 + 3];
        let scale = &self.lossy[SCALE][sample_index * 3..sample_index * 3 + 3];
        Qvvf::new(
            Quat::from_slice(rotation),
            Vec3::from_slice(translation),
            Vec3::from_slice(scale),
        )
    }

    fn encode_into(&self, body: &mut Vec<u8>) {
        for channel in [ROTATION, TRANSLATION, SCALE] {
            encode_channel(
                self.formats[channel],
                &self.samples[channel],
                CHANNEL_COMPONENTS[channel],
                body,
            );
        }
    }
}

/// Raises bit rates until every bone meets `error_threshold` or nothing can be refined.
///
/// Bones are visited parents first. Refining an ancestor for a child can move the
/// ancestor's own error, so passes repeat until one raises no bit rate.
fn optimize_bit_rates(clip: &AnimationClip, channels: &mut [BoneChannels], error_threshold: f32) {
    let bones = clip.skeleton().bones();
    let mut raw_pose = vec![Qvvf::IDENTITY; bones.len()];
    let mut lossy_pose = vec![Qvvf::IDENTITY; bones.len()];

    loop {
        let mut refined = false;
        for bone_index in 0..bones.len() {
            while bone_error(clip, channels, bone_index, &mut raw_pose, &mut lossy_pose)
                > error_threshold
            {
                let mut current = Some(bone_index);
                let mut target = None;
                while let Some(index) = current {
                    if channels[index].can_increase_bit_rate() {
                        target = Some(index);
                        break;
                    }
                    current = bones[index].parent_index.map(|parent| parent as usize);
                }

                let Some(index) = target else {
                    debug!(
                        bone = bone_index,
                        "bone error above threshold with no channel left to refine"
                    );
                    break;
                };
                channels[index].increase_bit_rate();
                refined = true;
            }
        }

        if !refined {
            break;
        }
    }
}

/// Worst object space error of one bone over every sample.
fn bone_error(
    clip: &AnimationClip,
    channels: &[BoneChannels],
    bone_index: usize,
    raw_pose: &mut [Qvvf],
    lossy_pose: &mut [Qvvf],
) -> f32 {
    let bones = clip.skeleton().bones();
    let mut worst_error = 0.0f32;
    for sample_index in 0..clip.num_samples() as usize {
        let mut current = Some(bone_index);
        while let Some(index) = current {
            raw_pose[index] = clip.bones()[index].sample(sample_index);
            lossy_pose[index] = channels[index].lossy_sample(sample_index);
            current = bones[index].parent_index.map(|parent| parent as usize);
        }

        let error = QvvErrorMetric::calculate_error(bones, raw_pose, lossy_pose, bone_index);
        worst_error = worst_error.max(error);
    }
    worst_error
}

// Used by the tests to inspect the chosen formats.
#[cfg(test)]
fn analyze_formats(
    clip: &AnimationClip,
    settings: &CompressionSettings,
) -> Vec<[ChannelFormat; 3]> {
    let mut channels: Vec<BoneChannels> = clip
        .bones()
        .iter()
        .map(|bone| BoneChannels::new(bone, settings))
        .collect();
    optimize_bit_rates(clip, &mut channels, settings.error_threshold);
    channels.iter().map(|channel| channel.formats).collect()
}
