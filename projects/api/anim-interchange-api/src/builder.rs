//! # Track/Skeleton Builder
//!
//! Turns decoded descriptors and the raw sample buffer into the engine's in-memory tracks.
//! Raw samples are track-major: sample `s` of track `t` starts at field
//! `(t * samples_per_track + s) * fields_per_sample`.

use anim_interchange_engine::{
    AnimationClip, RigidBone, RigidSkeleton, ScalarTrack, ScalarTrackDesc, TrackList,
};
use glam::{DQuat, DVec3};

use crate::descriptor::{
    DescriptorHeader, FieldCursor, ScalarTrackDescriptor, TransformTrackDescriptor,
};
use crate::error::InterchangeError;

/// Builds a clip with one bone per transform descriptor.
///
/// Rotations are renormalized in double precision before narrowing, translations and
/// scales are narrowed as is.
///
/// # Errors
///
/// [`InterchangeError::InvalidRawDataSize`] if `raw_data` is smaller than the header implies.
pub fn build_clip(
    header: &DescriptorHeader,
    descriptors: &[TransformTrackDescriptor],
    raw_data: &[u8],
) -> Result<AnimationClip, InterchangeError> {
    check_raw_size(header, raw_data)?;

    let skeleton = RigidSkeleton::new(
        descriptors
            .iter()
            .map(|desc| RigidBone {
                parent_index: desc.parent_index,
                vertex_distance: desc.shell_distance,
            })
            .collect(),
    );

    let num_samples = header.samples_per_track as usize;
    let mut clip = AnimationClip::new(skeleton, header.samples_per_track, header.sample_rate);
    let mut cursor = FieldCursor::new(raw_data, 0);

    for (bone_index, desc) in descriptors.iter().enumerate() {
        let bone = clip.bone_mut(bone_index);
        bone.output_index = desc.output_index;

        for sample in 0..num_samples {
            let mut fields = [0.0f64; 10];
            for field in &mut fields {
                *field = cursor.read_f64()?;
            }

            let rotation = DQuat::from_xyzw(fields[0], fields[1], fields[2], fields[3]).normalize();
            bone.rotations[sample] = rotation.as_quat();
            bone.translations[sample] = DVec3::new(fields[4], fields[5], fields[6]).as_vec3();
            bone.scales[sample] = DVec3::new(fields[7], fields[8], fields[9]).as_vec3();
        }
    }

    Ok(clip)
}

/// Builds a list with one single float track per scalar descriptor.
///
/// # Errors
///
/// [`InterchangeError::InvalidRawDataSize`] if `raw_data` is smaller than the header implies.
pub fn build_track_list(
    header: &DescriptorHeader,
    descriptors: &[ScalarTrackDescriptor],
    raw_data: &[u8],
) -> Result<TrackList, InterchangeError> {
    check_raw_size(header, raw_data)?;

    let mut cursor = FieldCursor::new(raw_data, 0);
    let mut tracks = Vec::with_capacity(descriptors.len());
    for desc in descriptors {
        let samples = (0..header.samples_per_track)
            .map(|_| cursor.read_f64().map(|value| value as f32))
            .collect::<Result<Vec<_>, _>>()?;
        tracks.push(ScalarTrack::from_samples(
            ScalarTrackDesc {
                output_index: desc.output_index,
                precision: desc.precision,
            },
            samples,
        ));
    }

    Ok(TrackList::new(
        tracks,
        header.samples_per_track,
        header.sample_rate,
    ))
}

fn check_raw_size(header: &DescriptorHeader, raw_data: &[u8]) -> Result<(), InterchangeError> {
    let expected = header
        .expected_raw_data_size()
        .ok_or(InterchangeError::InvalidRawDataSize {
            expected: usize::MAX,
            actual: raw_data.len(),
        })?;
    if raw_data.len() < expected {
        return Err(InterchangeError::InvalidRawDataSize {
            expected,
            actual: raw_data.len(),
        });
    }
    Ok(())
}
