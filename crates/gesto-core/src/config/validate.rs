//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.import.supported_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "import.supported_extensions must not be empty".into(),
            ));
        }
        if self.import.default_extension.is_empty()
            || self.import.default_extension.contains(['.', '/', '\\'])
        {
            return Err(ConfigError::ValidationError(
                "import.default_extension must be a bare extension like \"jpg\"".into(),
            ));
        }
        if self.thumbnail.max_pixel_size == 0 {
            return Err(ConfigError::ValidationError(
                "thumbnail.max_pixel_size must be > 0".into(),
            ));
        }
        if self.thumbnail.quality == 0 || self.thumbnail.quality > 100 {
            return Err(ConfigError::ValidationError(
                "thumbnail.quality must be between 1 and 100".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.focal.score_threshold) {
            return Err(ConfigError::ValidationError(
                "focal.score_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.focal.iou_threshold) {
            return Err(ConfigError::ValidationError(
                "focal.iou_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}
