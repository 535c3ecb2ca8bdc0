use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "gaokao-lens.json";

/// Bounds of the tolerance slider.
pub const TOLERANCE_MIN: u32 = 100;
pub const TOLERANCE_MAX: u32 = 5000;
pub const RANK_STEP: u32 = 100;

/// Runtime settings. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the data files.
    pub data_dir: PathBuf,
    /// General track, multi-year trend file.
    pub trend_file: String,
    /// General track per-major detail file (latest year).
    pub detail_file: String,
    /// Comprehensive-assessment per-major file.
    pub assessment_file: String,
    /// University preselected on the trend page.
    pub default_university: String,
    /// Batch label of the general undergraduate track in the detail file.
    pub general_batch: String,
    pub default_rank: u32,
    pub default_tolerance: u32,
    /// Font with CJK glyphs for the GUI. Well-known system paths are
    /// tried when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            trend_file: "gaokao22_24.csv".into(),
            detail_file: "admissions_2024.csv".into(),
            assessment_file: "admissions_zp_2024.csv".into(),
            default_university: "上海大学".into(),
            general_batch: "普通本科".into(),
            default_rank: 5000,
            default_tolerance: 500,
            font_path: None,
        }
    }
}

impl AppConfig {
    /// Read `path`, or `gaokao-lens.json` in the working directory if it
    /// exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::from_file(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.clamp();
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply a data directory given on the command line.
    pub fn with_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.data_dir = dir;
        }
        self
    }

    fn clamp(&mut self) {
        self.default_rank = self.default_rank.max(1);
        self.default_tolerance = self.default_tolerance.clamp(TOLERANCE_MIN, TOLERANCE_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"data_dir": "/srv/data", "default_tolerance": 99999}"#).unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(cfg.trend_file, "gaokao22_24.csv");
        assert_eq!(cfg.default_tolerance, TOLERANCE_MAX);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn cli_dir_overrides() {
        let cfg = AppConfig::default().with_data_dir(Some(PathBuf::from("d")));
        assert_eq!(cfg.data_dir, PathBuf::from("d"));
        let cfg = cfg.with_data_dir(None);
        assert_eq!(cfg.data_dir, PathBuf::from("d"));
    }
}
