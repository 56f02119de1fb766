//! Configuration system
//!
//! Frame-independent culling and sorting settings. These are the knobs a
//! host application tunes per scene; the per-frame matrices live in
//! [`crate::collect::FrameSetup`].

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        Self::parse(path, &contents)
    }

    /// Parse configuration text, picking the format from the path extension
    fn parse(path: &str, contents: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its allowed range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// # Culling Settings
///
/// Controls which rejection tests run during collection and which render
/// passes get sorted. Missing fields in a config file take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingSettings {
    /// Reject drawables whose world bounds miss the view frustum
    pub frustum_culling: bool,

    /// Minimum on-screen size in approximate pixels. Values `<= 1` disable
    /// small-feature culling (and coverage computation) entirely.
    pub small_feature_threshold: f32,

    /// Sort the opaque pass. Off by default; full sorts of large opaque
    /// sets are slow and the depth test already resolves visibility.
    pub sort_opaque: bool,

    /// Sort the transparent pass back to front
    pub sort_transparent: bool,
}

impl Default for CullingSettings {
    fn default() -> Self {
        Self {
            frustum_culling: true,
            small_feature_threshold: 1.0,
            sort_opaque: false,
            sort_transparent: true,
        }
    }
}

impl CullingSettings {
    /// Enable or disable frustum culling
    pub fn with_frustum_culling(mut self, enabled: bool) -> Self {
        self.frustum_culling = enabled;
        self
    }

    /// Set the small-feature coverage threshold in pixels
    pub fn with_small_feature_threshold(mut self, threshold: f32) -> Self {
        self.small_feature_threshold = threshold;
        self
    }

    /// Enable or disable opaque pass sorting
    pub fn with_opaque_sorting(mut self, enabled: bool) -> Self {
        self.sort_opaque = enabled;
        self
    }

    /// Enable or disable transparent pass sorting
    pub fn with_transparent_sorting(mut self, enabled: bool) -> Self {
        self.sort_transparent = enabled;
        self
    }

    /// Whether coverage is computed and compared during culling
    pub fn small_feature_culling(&self) -> bool {
        self.small_feature_threshold > 1.0
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.small_feature_threshold.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "small_feature_threshold must be finite, got {}",
                self.small_feature_threshold
            )));
        }
        Ok(())
    }
}

impl Config for CullingSettings {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_culling_settings_default() {
        let settings = CullingSettings::default();
        assert!(settings.frustum_culling);
        assert!(!settings.sort_opaque);
        assert!(settings.sort_transparent);
        assert!(!settings.small_feature_culling());
    }

    #[test]
    fn test_parse_toml_fills_missing_fields() {
        let settings = CullingSettings::parse(
            "culling.toml",
            "small_feature_threshold = 4.0\nsort_opaque = true\n",
        )
        .unwrap();

        assert!(settings.small_feature_culling());
        assert!(settings.sort_opaque);
        assert!(settings.frustum_culling);
        assert!(settings.sort_transparent);
    }

    #[test]
    fn test_parse_ron() {
        let settings = CullingSettings::parse(
            "culling.ron",
            "(frustum_culling: false, sort_transparent: false)",
        )
        .unwrap();

        assert!(!settings.frustum_culling);
        assert!(!settings.sort_transparent);
    }

    #[test]
    fn test_unsupported_format() {
        let result = CullingSettings::parse("culling.json", "{}");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir().join("drawable_collection_settings_test.toml");
        let path = path.to_string_lossy().into_owned();
        let settings = CullingSettings::default()
            .with_small_feature_threshold(2.5)
            .with_opaque_sorting(true);

        settings.save_to_file(&path).unwrap();
        let loaded = CullingSettings::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_validate_rejects_nan_threshold() {
        let settings = CullingSettings::default().with_small_feature_threshold(f32::NAN);
        assert!(settings.validate().is_err());
    }
}
