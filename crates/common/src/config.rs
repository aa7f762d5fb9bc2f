//! Automaton configuration.
//!
//! Accepted formats, chosen by file extension:
//! ```text
//! *.yaml | *.yml  - serde_yaml
//! *.json          - serde_json
//! ```

use crate::types::{FieldSize, TILE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension: {0:?}")]
    UnsupportedFormat(String),
    #[error("field size {width}x{height} is not a multiple of the {tile}-cell tile")]
    UnalignedField { width: u32, height: u32, tile: u32 },
    #[error("field size must be non-zero")]
    EmptyField,
    #[error("kernel size must be non-zero")]
    EmptyKernel,
    #[error("brush radius must be finite and non-negative, got {0}")]
    InvalidBrushRadius(f32),
}

/// Convolution kernel extent, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSize {
    pub width: u32,
    pub height: u32,
}

impl Default for KernelSize {
    fn default() -> Self {
        Self {
            width: 25,
            height: 25,
        }
    }
}

/// Interactive paint brush settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushConfig {
    /// Disk radius, in cells.
    pub radius: f32,
    /// Value written into painted cells.
    pub fill: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            fill: 1.0,
        }
    }
}

/// Top-level configuration for one automaton instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonConfig {
    pub field: FieldSize,
    pub kernel: KernelSize,
    pub brush: BrushConfig,
    /// Seed for the engine's noise fill.
    pub seed: u32,
}

impl AutomatonConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the preconditions the simulation core relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field.width == 0 || self.field.height == 0 {
            return Err(ConfigError::EmptyField);
        }
        if !self.field.is_tile_aligned() {
            return Err(ConfigError::UnalignedField {
                width: self.field.width,
                height: self.field.height,
                tile: TILE_SIZE,
            });
        }
        if self.kernel.width == 0 || self.kernel.height == 0 {
            return Err(ConfigError::EmptyKernel);
        }
        if !self.brush.radius.is_finite() || self.brush.radius < 0.0 {
            return Err(ConfigError::InvalidBrushRadius(self.brush.radius));
        }
        Ok(())
    }

    /// Serialize to YAML, the format written by `ringlife-cli config`.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_documented_yaml() {
        let config = AutomatonConfig::default();
        assert_eq!(config.field, FieldSize::new(1024, 1024));
        assert_eq!(config.kernel, KernelSize { width: 25, height: 25 });
        assert_eq!(config.seed, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_yaml_with_partial_fields() {
        let file = write_temp(".yaml", "field:\n  width: 320\n  height: 320\nseed: 9\n");
        let config = AutomatonConfig::load(file.path()).unwrap();
        assert_eq!(config.field, FieldSize::new(320, 320));
        assert_eq!(config.seed, 9);
        assert_eq!(config.kernel, KernelSize::default());
        assert_eq!(config.brush, BrushConfig::default());
    }

    #[test]
    fn load_json() {
        let file = write_temp(
            ".json",
            r#"{"field":{"width":64,"height":128},"brush":{"radius":4.5,"fill":0.25}}"#,
        );
        let config = AutomatonConfig::load(file.path()).unwrap();
        assert_eq!(config.field, FieldSize::new(64, 128));
        assert_eq!(config.brush.radius, 4.5);
        assert_eq!(config.brush.fill, 0.25);
    }

    #[test]
    fn unknown_extension_rejected() {
        let file = write_temp(".toml", "seed = 1");
        assert!(matches!(
            AutomatonConfig::load(file.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn unaligned_field_rejected() {
        let file = write_temp(".yml", "field: { width: 100, height: 64 }");
        assert!(matches!(
            AutomatonConfig::load(file.path()),
            Err(ConfigError::UnalignedField { width: 100, .. })
        ));
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let mut config = AutomatonConfig::default();
        config.field = FieldSize::new(0, 64);
        assert!(matches!(config.validate(), Err(ConfigError::EmptyField)));

        let mut config = AutomatonConfig::default();
        config.kernel.height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::EmptyKernel)));

        let mut config = AutomatonConfig::default();
        config.brush.radius = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBrushRadius(_))
        ));
    }

    #[test]
    fn yaml_output_loads_back() {
        let mut config = AutomatonConfig::default();
        config.seed = 77;
        let yaml = config.to_yaml().unwrap();
        let file = write_temp(".yaml", &yaml);
        assert_eq!(AutomatonConfig::load(file.path()).unwrap(), config);
    }
}
