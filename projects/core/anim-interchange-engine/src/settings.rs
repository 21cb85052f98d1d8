//! Compression settings and their builder.

use crate::error::EngineError;

/// Which blob shape the compressor writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlobLayout {
    /// Legacy shapes: a clip tag for transforms, a track list tag for scalars.
    Legacy,
    /// The unified track list shape for every track type.
    #[default]
    TrackList,
}

/// Settings controlling a single compression pass.
///
/// Scalar tracks carry their own precision and only use [`CompressionSettings::layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionSettings {
    /// Largest object space error tolerated on any virtual vertex.
    pub error_threshold: f32,
    /// Largest rotation angle, in radians, for a rotation channel to count as constant.
    pub constant_rotation_threshold_angle: f32,
    /// Largest translation delta for a translation channel to count as constant.
    pub constant_translation_threshold: f32,
    /// Largest scale delta for a scale channel to count as constant.
    pub constant_scale_threshold: f32,
    /// Blob shape to write.
    pub layout: BlobLayout,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            error_threshold: 0.01,
            constant_rotation_threshold_angle: 0.000_03,
            constant_translation_threshold: 0.001,
            constant_scale_threshold: 0.000_01,
            layout: BlobLayout::TrackList,
        }
    }
}

impl CompressionSettings {
    /// Starts building settings from the defaults.
    pub fn builder() -> CompressionSettingsBuilder {
        CompressionSettingsBuilder::new()
    }

    /// Checks every threshold is finite and non-negative.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidSettings`] naming the first offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        let fields = [
            (self.error_threshold, "error_threshold"),
            (
                self.constant_rotation_threshold_angle,
                "constant_rotation_threshold_angle",
            ),
            (
                self.constant_translation_threshold,
                "constant_translation_threshold",
            ),
            (self.constant_scale_threshold, "constant_scale_threshold"),
        ];

        for (value, name) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidSettings(name));
            }
        }
        Ok(())
    }
}

/// Builder for [`CompressionSettings`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompressionSettingsBuilder {
    settings: CompressionSettings,
}

impl CompressionSettingsBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest tolerated object space error
    pub fn error_threshold(mut self, threshold: f32) -> Self {
        self.settings.error_threshold = threshold;
        self
    }

    /// Set the constant rotation threshold, in radians
    pub fn constant_rotation_threshold_angle(mut self, radians: f32) -> Self {
        self.settings.constant_rotation_threshold_angle = radians;
        self
    }

    /// Set the constant translation threshold
    pub fn constant_translation_threshold(mut self, threshold: f32) -> Self {
        self.settings.constant_translation_threshold = threshold;
        self
    }

    /// Set the constant scale threshold
    pub fn constant_scale_threshold(mut self, threshold: f32) -> Self {
        self.settings.constant_scale_threshold = threshold;
        self
    }

    /// Set the blob shape to write
    pub fn layout(mut self, layout: BlobLayout) -> Self {
        self.settings.layout = layout;
        self
    }

    /// Build the settings
    pub fn build(self) -> CompressionSettings {
        self.settings
    }
}
