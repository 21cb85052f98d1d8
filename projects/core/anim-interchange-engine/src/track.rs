//! In-memory tracks handed to the compressor.
//!
//! A transform clip is a [`RigidSkeleton`] (hierarchy and error weighting only) plus one
//! [`AnimatedBone`] per skeleton bone. Scalar tracks are independent and carry their own
//! precision.

use glam::{Quat, Vec3};

use crate::qvv::Qvvf;

/// A bone of a rigid skeleton.
///
/// Carries only what the hierarchical error metric needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBone {
    /// Index of the parent bone, [`None`] for roots.
    pub parent_index: Option<u32>,
    /// Distance of the virtual vertices used to measure this bone's error.
    pub vertex_distance: f32,
}

/// A flat hierarchy of bones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RigidSkeleton {
    bones: Vec<RigidBone>,
}

impl RigidSkeleton {
    /// Creates a skeleton from its bones.
    ///
    /// The hierarchy is validated when the clip is compressed.
    pub fn new(bones: Vec<RigidBone>) -> Self {
        Self { bones }
    }

    /// The bones of the skeleton.
    #[inline]
    pub fn bones(&self) -> &[RigidBone] {
        &self.bones
    }

    /// Number of bones.
    #[inline]
    pub fn num_bones(&self) -> usize {
        self.bones.len()
    }
}

/// The animated samples of one bone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimatedBone {
    /// Position of this bone in the compressed output, [`None`] keeps the bone index.
    pub output_index: Option<u32>,
    /// Rotation samples.
    pub rotations: Vec<Quat>,
    /// Translation samples.
    pub translations: Vec<Vec3>,
    /// Scale samples.
    pub scales: Vec<Vec3>,
}

impl AnimatedBone {
    /// Creates a bone with `num_samples` identity samples.
    pub fn with_identity_samples(output_index: Option<u32>, num_samples: usize) -> Self {
        Self {
            output_index,
            rotations: vec![Quat::IDENTITY; num_samples],
            translations: vec![Vec3::ZERO; num_samples],
            scales: vec![Vec3::ONE; num_samples],
        }
    }

    /// Returns the transform at `sample_index`.
    #[inline]
    pub fn sample(&self, sample_index: usize) -> Qvvf {
        Qvvf::new(
            self.rotations[sample_index],
            self.translations[sample_index],
            self.scales[sample_index],
        )
    }

    /// Stores the transform at `sample_index`.
    #[inline]
    pub fn set_sample(&mut self, sample_index: usize, transform: Qvvf) {
        self.rotations[sample_index] = transform.rotation;
        self.translations[sample_index] = transform.translation;
        self.scales[sample_index] = transform.scale;
    }
}

/// A uniformly sampled transform clip.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    skeleton: RigidSkeleton,
    bones: Vec<AnimatedBone>,
    num_samples: u32,
    sample_rate: f32,
}

impl AnimationClip {
    /// Creates a clip with identity samples for every skeleton bone.
    pub fn new(skeleton: RigidSkeleton, num_samples: u32, sample_rate: f32) -> Self {
        let bones = (0..skeleton.num_bones())
            .map(|_| AnimatedBone::with_identity_samples(None, num_samples as usize))
            .collect();

        Self {
            skeleton,
            bones,
            num_samples,
            sample_rate,
        }
    }

    /// The skeleton this clip animates.
    #[inline]
    pub fn skeleton(&self) -> &RigidSkeleton {
        &self.skeleton
    }

    /// The animated bones, in skeleton order.
    #[inline]
    pub fn bones(&self) -> &[AnimatedBone] {
        &self.bones
    }

    /// Mutable access to one animated bone.
    #[inline]
    pub fn bone_mut(&mut self, bone_index: usize) -> &mut AnimatedBone {
        &mut self.bones[bone_index]
    }

    /// Number of samples per bone.
    #[inline]
    pub fn num_samples(&self) -> u32 {
        self.num_samples
    }

    /// Samples per second.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Duration in seconds between the first and last sample.
    #[inline]
    pub fn duration(&self) -> f32 {
        calculate_duration(self.num_samples, self.sample_rate)
    }
}

/// Description of a scalar track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarTrackDesc {
    /// Position of this track in the compressed output, [`None`] keeps the track index.
    pub output_index: Option<u32>,
    /// Largest error tolerated for this track.
    pub precision: f32,
}

/// A uniformly sampled track of 1 to 4 floats per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarTrack {
    desc: ScalarTrackDesc,
    num_components: usize,
    values: Vec<f32>,
}

impl ScalarTrack {
    /// Creates a zeroed track holding `num_samples` samples of `num_components` floats.
    pub fn new(desc: ScalarTrackDesc, num_components: usize, num_samples: usize) -> Self {
        Self {
            desc,
            num_components,
            values: vec![0.0; num_components * num_samples],
        }
    }

    /// Creates a single float track from its samples.
    pub fn from_samples(desc: ScalarTrackDesc, samples: Vec<f32>) -> Self {
        Self {
            desc,
            num_components: 1,
            values: samples,
        }
    }

    /// The track description.
    #[inline]
    pub fn desc(&self) -> &ScalarTrackDesc {
        &self.desc
    }

    /// Floats per sample.
    #[inline]
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Number of samples.
    #[inline]
    pub fn num_samples(&self) -> usize {
        if self.num_components == 0 {
            0
        } else {
            self.values.len() / self.num_components
        }
    }

    /// Every sample, `num_components` floats each.
    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// The components of one sample.
    #[inline]
    pub fn sample(&self, sample_index: usize) -> &[f32] {
        let start = sample_index * self.num_components;
        &self.values[start..start + self.num_components]
    }

    /// Mutable access to the components of one sample.
    #[inline]
    pub fn sample_mut(&mut self, sample_index: usize) -> &mut [f32] {
        let start = sample_index * self.num_components;
        &mut self.values[start..start + self.num_components]
    }
}

/// A list of independent scalar tracks sharing a sample count and rate.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackList {
    tracks: Vec<ScalarTrack>,
    num_samples: u32,
    sample_rate: f32,
}

impl TrackList {
    /// Creates a list from its tracks.
    pub fn new(tracks: Vec<ScalarTrack>, num_samples: u32, sample_rate: f32) -> Self {
        Self {
            tracks,
            num_samples,
            sample_rate,
        }
    }

    /// The tracks.
    #[inline]
    pub fn tracks(&self) -> &[ScalarTrack] {
        &self.tracks
    }

    /// Number of samples per track.
    #[inline]
    pub fn num_samples(&self) -> u32 {
        self.num_samples
    }

    /// Samples per second.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Duration in seconds between the first and last sample.
    #[inline]
    pub fn duration(&self) -> f32 {
        calculate_duration(self.num_samples, self.sample_rate)
    }
}

/// Duration between the first and last of `num_samples` uniformly spaced samples.
#[inline]
pub fn calculate_duration(num_samples: u32, sample_rate: f32) -> f32 {
    if num_samples <= 1 {
        0.0
    } else {
        (num_samples - 1) as f32 / sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_starts_with_identity_bones() {
        let skeleton = RigidSkeleton::new(vec![
            RigidBone {
                parent_index: None,
                vertex_distance: 3.0,
            },
            RigidBone {
                parent_index: Some(0),
                vertex_distance: 3.0,
            },
        ]);
        let clip = AnimationClip::new(skeleton, 4, 30.0);

        assert_eq!(clip.bones().len(), 2);
        assert_eq!(clip.bones()[1].sample(3), Qvvf::IDENTITY);
        assert!((clip.duration() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn scalar_track_samples_are_component_major() {
        let desc = ScalarTrackDesc {
            output_index: None,
            precision: 0.001,
        };
        let mut track = ScalarTrack::new(desc, 3, 2);
        track.sample_mut(1).copy_from_slice(&[1.0, 2.0, 3.0]);

        assert_eq!(track.num_samples(), 2);
        assert_eq!(track.sample(0), &[0.0, 0.0, 0.0]);
        assert_eq!(track.sample(1), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn single_sample_duration_is_zero() {
        assert_eq!(calculate_duration(1, 30.0), 0.0);
        assert_eq!(calculate_duration(0, 30.0), 0.0);
        assert_eq!(calculate_duration(31, 30.0), 1.0);
    }
}
