use crate::config::GrowthParams;
use crate::error::{PlumError, PlumResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Values from `config.toml`; anything missing falls back to built-in defaults
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub growth: GrowthSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct GrowthSettings {
    pub length: Option<f64>,
    pub min_branch: Option<u32>,
    pub color: Option<String>,
    pub fps: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DisplaySettings {
    pub density: Option<f64>,  // Device pixels (braille dots) per logical unit
}

impl Settings {
    pub fn load() -> PlumResult<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> PlumResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|source| PlumError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plum")
            .join("config.toml")
    }

    /// Growth parameters with file values layered over the defaults
    pub fn growth_params(&self) -> GrowthParams {
        let defaults = GrowthParams::default();
        GrowthParams {
            length: self.growth.length.unwrap_or(defaults.length),
            min_branch: self.growth.min_branch.unwrap_or(defaults.min_branch),
            color: self.growth.color.clone().unwrap_or(defaults.color),
            fps: self.growth.fps.unwrap_or(defaults.fps),
        }
    }

    pub fn density(&self) -> f64 {
        self.display.density.unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.growth_params(), GrowthParams::default());
        assert_eq!(settings.density(), 1.0);
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = Settings::parse(
            r##"
[growth]
length = 6.5
color = "#ffaacc"

[display]
density = 2.0
"##,
        )
        .unwrap();
        let params = settings.growth_params();
        assert_eq!(params.length, 6.5);
        assert_eq!(params.color, "#ffaacc");
        assert_eq!(params.min_branch, GrowthParams::default().min_branch);
        assert_eq!(settings.density(), 2.0);
    }

    #[test]
    fn malformed_file_is_reported() {
        assert!(Settings::parse("[growth]\nlength = \"long\"").is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let settings = Settings::load_from(Path::new("/nonexistent/plum/config.toml")).unwrap();
        assert_eq!(settings.growth_params(), GrowthParams::default());
    }
}
