//! Rotation, translation and scale transform.

use anim_interchange_common::QvvfLayout;
use glam::{Quat, Vec3};

/// A rigid transform with non-uniform scale.
///
/// Points are transformed as `rotation * (scale * point) + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Qvvf {
    /// Rotation quaternion.
    pub rotation: Quat,
    /// Translation.
    pub translation: Vec3,
    /// Per axis scale.
    pub scale: Vec3,
}

impl Default for Qvvf {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Qvvf {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Creates a transform from its parts.
    #[inline]
    pub fn new(rotation: Quat, translation: Vec3, scale: Vec3) -> Self {
        Self {
            rotation,
            translation,
            scale,
        }
    }

    /// Transforms a point by this transform.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }

    /// Returns `true` if every component is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.rotation.is_finite() && self.translation.is_finite() && self.scale.is_finite()
    }

    /// Converts into the native output element layout.
    #[inline]
    pub fn to_layout(&self) -> QvvfLayout {
        QvvfLayout {
            rotation: self.rotation.to_array(),
            translation: self.translation.extend(0.0).to_array(),
            scale: self.scale.extend(0.0).to_array(),
        }
    }

    /// Converts from the native output element layout.
    #[inline]
    pub fn from_layout(layout: &QvvfLayout) -> Self {
        Self {
            rotation: Quat::from_array(layout.rotation),
            translation: Vec3::new(layout.translation[0], layout.translation[1], layout.translation[2]),
            scale: Vec3::new(layout.scale[0], layout.scale[1], layout.scale[2]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_points_untouched() {
        let point = Vec3::new(1.0, -2.0, 3.0);
        assert_eq!(Qvvf::IDENTITY.transform_point(point), point);
    }

    #[test]
    fn transform_applies_scale_then_rotation_then_translation() {
        let transform = Qvvf::new(
            Quat::from_rotation_z(core::f32::consts::FRAC_PI_2),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::splat(2.0),
        );
        let result = transform.transform_point(Vec3::X);
        assert!((result - Vec3::new(10.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn layout_round_trip_zeroes_padding_lanes() {
        let transform = Qvvf::new(Quat::IDENTITY, Vec3::new(1.0, 2.0, 3.0), Vec3::ONE);
        let layout = transform.to_layout();
        assert_eq!(layout.translation, [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(layout.scale[3], 0.0);
        assert_eq!(Qvvf::from_layout(&layout), transform);
    }
}
