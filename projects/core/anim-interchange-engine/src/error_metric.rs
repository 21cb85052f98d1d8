//! Error metrics.
//!
//! [`QvvErrorMetric`] measures transform error in object space: each bone carries three
//! virtual vertices on its local axes at the bone's vertex distance, and the error of a
//! bone is the largest distance between a vertex transformed through the raw hierarchy
//! and through the lossy hierarchy. [`ScalarErrorMetric`] is the largest absolute
//! component difference.

use glam::Vec3;

use crate::qvv::Qvvf;
use crate::track::RigidBone;

/// Hierarchical object space metric for transform tracks.
#[derive(Debug, Clone, Copy, Default)]
pub struct QvvErrorMetric;

impl QvvErrorMetric {
    /// Transforms a point from the local space of `bone_index` into object space.
    ///
    /// `pose` holds one local transform per bone in skeleton order. Parents must precede
    /// their children.
    pub fn local_to_object_point(
        bones: &[RigidBone],
        pose: &[Qvvf],
        bone_index: usize,
        point: Vec3,
    ) -> Vec3 {
        let mut point = point;
        let mut current = Some(bone_index);
        while let Some(index) = current {
            point = pose[index].transform_point(point);
            current = bones[index].parent_index.map(|parent| parent as usize);
        }
        point
    }

    /// Object space error of one bone between a raw and a lossy pose.
    pub fn calculate_error(
        bones: &[RigidBone],
        raw_pose: &[Qvvf],
        lossy_pose: &[Qvvf],
        bone_index: usize,
    ) -> f32 {
        let distance = bones[bone_index].vertex_distance;

        [Vec3::X, Vec3::Y, Vec3::Z]
            .into_iter()
            .map(|axis| {
                let vertex = axis * distance;
                let raw = Self::local_to_object_point(bones, raw_pose, bone_index, vertex);
                let lossy = Self::local_to_object_point(bones, lossy_pose, bone_index, vertex);
                raw.distance(lossy)
            })
            .fold(0.0, f32::max)
    }
}

/// Flat metric for scalar tracks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarErrorMetric;

impl ScalarErrorMetric {
    /// Largest absolute difference between matching components.
    #[inline]
    pub fn calculate_error(raw: &[f32], lossy: &[f32]) -> f32 {
        raw.iter()
            .zip(lossy)
            .map(|(raw, lossy)| (raw - lossy).abs())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn chain() -> Vec<RigidBone> {
        vec![
            RigidBone {
                parent_index: None,
                vertex_distance: 1.0,
            },
            RigidBone {
                parent_index: Some(0),
                vertex_distance: 2.0,
            },
        ]
    }

    #[test]
    fn identical_poses_have_no_error() {
        let bones = chain();
        let pose = [Qvvf::IDENTITY; 2];
        assert_eq!(QvvErrorMetric::calculate_error(&bones, &pose, &pose, 1), 0.0);
    }

    #[test]
    fn parent_translation_propagates_to_child() {
        let bones = chain();
        let raw = [Qvvf::IDENTITY; 2];
        let mut lossy = raw;
        lossy[0].translation = Vec3::new(0.5, 0.0, 0.0);

        let error = QvvErrorMetric::calculate_error(&bones, &raw, &lossy, 1);
        assert!((error - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rotation_error_scales_with_vertex_distance() {
        let bones = chain();
        let raw = [Qvvf::IDENTITY; 2];
        let mut lossy = raw;
        lossy[1].rotation = Quat::from_rotation_z(core::f32::consts::FRAC_PI_2);

        // The X vertex at distance 2 lands on the Y axis.
        let error = QvvErrorMetric::calculate_error(&bones, &raw, &lossy, 1);
        assert!((error - 2.0 * core::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn scalar_error_is_largest_component_difference() {
        assert_eq!(
            ScalarErrorMetric::calculate_error(&[1.0, 2.0, 3.0], &[1.5, 2.0, 1.0]),
            2.0
        );
    }
}
