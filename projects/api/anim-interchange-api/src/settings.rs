//! Settings for the encode entry points.
//!
//! Thresholds and precisions travel in the metadata buffer; the only choice left to the
//! caller is the shape of the produced blob.

use anim_interchange_engine::{BlobLayout, CompressionSettings};

use crate::descriptor::TransformTrackDescriptor;

/// Caller side configuration of the encode path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterchangeSettings {
    /// Shape of the produced blob.
    pub layout: BlobLayout,
}

impl InterchangeSettings {
    /// Creates a builder with default settings.
    pub fn builder() -> InterchangeSettingsBuilder {
        InterchangeSettingsBuilder::new()
    }

    /// Engine settings for a transform clip.
    ///
    /// Thresholds come from the first descriptor and apply to the whole clip.
    pub(crate) fn clip_settings(
        &self,
        first: Option<&TransformTrackDescriptor>,
    ) -> CompressionSettings {
        let mut builder = CompressionSettings::builder().layout(self.layout);
        if let Some(desc) = first {
            builder = builder
                .error_threshold(desc.precision)
                .constant_rotation_threshold_angle(
                    desc.constant_rotation_threshold_angle.to_radians(),
                )
                .constant_translation_threshold(desc.constant_translation_threshold)
                .constant_scale_threshold(desc.constant_scale_threshold);
        }
        builder.build()
    }

    /// Engine settings for a scalar track list; precisions stay per track.
    pub(crate) fn track_list_settings(&self) -> CompressionSettings {
        CompressionSettings::builder().layout(self.layout).build()
    }
}

/// Builder for [`InterchangeSettings`].
///
/// # Examples
///
/// ```
/// use anim_interchange_api::{BlobLayout, InterchangeSettingsBuilder};
///
/// let settings = InterchangeSettingsBuilder::new()
///     .layout(BlobLayout::Legacy)
///     .build();
/// assert_eq!(settings.layout, BlobLayout::Legacy);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InterchangeSettingsBuilder {
    settings: InterchangeSettings,
}

impl InterchangeSettingsBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shape of the produced blob.
    pub fn layout(mut self, layout: BlobLayout) -> Self {
        self.settings.layout = layout;
        self
    }

    /// Builds the settings.
    pub fn build(self) -> InterchangeSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_settings_use_first_descriptor() {
        let first = TransformTrackDescriptor {
            output_index: None,
            parent_index: None,
            precision: 0.05,
            shell_distance: 3.0,
            constant_rotation_threshold_angle: 180.0,
            constant_translation_threshold: 0.5,
            constant_scale_threshold: 0.25,
        };
        let settings = InterchangeSettings::builder()
            .layout(BlobLayout::Legacy)
            .build()
            .clip_settings(Some(&first));

        assert_eq!(settings.error_threshold, 0.05);
        assert!((settings.constant_rotation_threshold_angle - core::f32::consts::PI).abs() < 1e-6);
        assert_eq!(settings.constant_translation_threshold, 0.5);
        assert_eq!(settings.constant_scale_threshold, 0.25);
        assert_eq!(settings.layout, BlobLayout::Legacy);
    }

    #[test]
    fn empty_clip_falls_back_to_defaults() {
        let settings = InterchangeSettings::default().clip_settings(None);
        assert_eq!(settings, CompressionSettings::default());
        assert_eq!(
            InterchangeSettings::default().track_list_settings().layout,
            BlobLayout::TrackList
        );
    }
}
