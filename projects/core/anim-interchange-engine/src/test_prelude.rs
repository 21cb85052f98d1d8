//! Common test imports and utilities for the engine crate.
//!
//! This module is only available during testing.

use glam::{Quat, Vec3};

pub use rstest::rstest;

use crate::track::{
    AnimationClip, RigidBone, RigidSkeleton, ScalarTrack, ScalarTrackDesc, TrackList,
};

/// A chain of `num_bones` bones, each parented to the previous one.
pub(crate) fn chain_skeleton(num_bones: usize) -> RigidSkeleton {
    RigidSkeleton::new(
        (0..num_bones)
            .map(|bone| RigidBone {
                parent_index: bone.checked_sub(1).map(|parent| parent as u32),
                vertex_distance: 1.0,
            })
            .collect(),
    )
}

/// A clip where every bone holds identity samples.
pub(crate) fn static_clip(num_bones: usize, num_samples: u32) -> AnimationClip {
    AnimationClip::new(chain_skeleton(num_bones), num_samples, 30.0)
}

/// A clip where every bone sways around Z and bobs along Y.
///
/// Bones are offset by one unit along X from their parent, scale stays at one.
pub(crate) fn wave_clip(num_bones: usize, num_samples: u32) -> AnimationClip {
    let mut clip = static_clip(num_bones, num_samples);
    for bone in 0..num_bones {
        let animated = clip.bone_mut(bone);
        for sample in 0..num_samples as usize {
            let phase = sample as f32 * 0.4 + bone as f32;
            animated.rotations[sample] = Quat::from_rotation_z(0.5 * phase.sin());
            animated.translations[sample] = Vec3::new(bone as f32, 0.1 * phase.cos(), 0.0);
        }
    }
    clip
}

/// `num_tracks` single float tracks ramping linearly at different speeds.
pub(crate) fn ramp_track_list(num_tracks: usize, num_samples: u32) -> TrackList {
    let tracks = (0..num_tracks)
        .map(|track| {
            ScalarTrack::from_samples(
                ScalarTrackDesc {
                    output_index: None,
                    precision: 0.001,
                },
                (0..num_samples)
                    .map(|sample| sample as f32 * (track + 1) as f32)
                    .collect(),
            )
        })
        .collect();
    TrackList::new(tracks, num_samples, 30.0)
}
