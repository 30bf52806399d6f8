use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::language::Language;

/// Project-local configuration file name.
pub const CONFIG_FILE: &str = "lng.toml";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    /// Writable directory holding the table files.
    pub localization_dir: PathBuf,
    /// Read-only directory seeding the localization dir on first use.
    pub templates_dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    // Language name or code; "auto" follows the LANG environment variable
    pub language: String,
    // Language tried when the primary value is blank
    pub fallback: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            localization_dir: PathBuf::from("localization"),
            templates_dir: PathBuf::from("localization_defaults"),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            fallback: "english".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load `lng.toml` from the working directory, or the defaults when
    /// the file does not exist.
    pub fn new() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(Path::new(CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// The configured display language; "auto" resolves through the LANG
    /// environment variable.
    pub fn effective_language(&self) -> Option<Language> {
        if self.display.language == "auto" {
            std::env::var("LANG")
                .ok()
                .and_then(|code| Language::from_locale_code(&code))
        } else {
            Language::from_name_or_code(&self.display.language)
        }
    }

    pub fn fallback_language(&self) -> Option<Language> {
        Language::from_name_or_code(&self.display.fallback)
    }
}
