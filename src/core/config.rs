//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::schema::{self, PtaType};

/// Default upload limit carried over from the legacy tool, in MB
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 200;

/// ptadiff configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sheet holding the spring table
    pub sheet: Option<String>,

    /// Header of the matching key column
    pub key_column: Option<String>,

    /// Absolute mass tolerance in kg for the mass status
    pub mass_tolerance: Option<f64>,

    /// Maximum accepted input file size in MB
    pub max_file_size_mb: Option<u64>,

    /// Default output format
    pub default_format: Option<String>,

    /// Default PTA type
    pub pta_type: Option<PtaType>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/ptadiff/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Environment variables
        if let Ok(sheet) = std::env::var("PTADIFF_SHEET") {
            config.sheet = Some(sheet);
        }
        if let Ok(key) = std::env::var("PTADIFF_KEY_COLUMN") {
            config.key_column = Some(key);
        }
        if let Ok(tol) = std::env::var("PTADIFF_MASS_TOLERANCE") {
            if let Ok(tol) = tol.parse() {
                config.mass_tolerance = Some(tol);
            }
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ptadiff")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.sheet.is_some() {
            self.sheet = other.sheet;
        }
        if other.key_column.is_some() {
            self.key_column = other.key_column;
        }
        if other.mass_tolerance.is_some() {
            self.mass_tolerance = other.mass_tolerance;
        }
        if other.max_file_size_mb.is_some() {
            self.max_file_size_mb = other.max_file_size_mb;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.pta_type.is_some() {
            self.pta_type = other.pta_type;
        }
    }

    /// Sheet name, falling back to the standard PTA sheet
    pub fn sheet(&self) -> &str {
        self.sheet.as_deref().unwrap_or(schema::DEFAULT_SHEET)
    }

    /// Mass tolerance in kg, exact comparison by default
    pub fn mass_tolerance(&self) -> f64 {
        self.mass_tolerance.unwrap_or(0.0)
    }

    /// Maximum accepted input file size in MB
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_mb.unwrap_or(DEFAULT_MAX_FILE_SIZE_MB)
    }

    /// Default PTA type
    pub fn pta_type(&self) -> PtaType {
        self.pta_type.unwrap_or_default()
    }
}
