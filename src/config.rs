//! Configuration handling for the portal client

use crate::api::DEFAULT_ADDRESS;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Form shown on the application page
pub const APPLICATION_FORM: &str = "application_info";
/// Form shown on the travel page
pub const TRAVEL_FORM: &str = "transportation";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "hackportal", "hackportal-tui")
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Portal API address (`HACKPORTAL_API_ADDRESS` wins when set)
    pub api_address: String,
    /// Form behind the application page
    pub form_name: String,
    /// chrono format for showing and typing dates
    pub date_format: String,
    /// Sent with sign-up as the confirmation link target
    pub confirmation_url: String,
    /// Show the travel page to applicants
    pub show_travel: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_address: DEFAULT_ADDRESS.to_string(),
            form_name: APPLICATION_FORM.to_string(),
            date_format: "%Y-%m-%d".to_string(),
            confirmation_url: "https://root.hackportal.dev".to_string(),
            show_travel: false,
        }
    }
}

impl PortalConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Directory for the session cache and local store
    pub fn data_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Load configuration from the user's config dir, or defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file; a missing file gives defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the user's config dir
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
