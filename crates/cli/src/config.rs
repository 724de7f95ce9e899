//! CLI configuration

use anyhow::{Context, Result};
use directories::ProjectDirs;
use okshouse_admin_core::SessionConfig;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub session: SessionConfig,
    pub api_base_url: String,
    pub data_dir: PathBuf,
}

impl CliConfig {
    /// Session settings from `config_path` and `OKS_ADMIN__*` variables,
    /// plus the command-line overrides
    pub fn load(
        config_path: Option<&Path>,
        api_url: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let session = SessionConfig::load(config_path).context("Invalid session configuration")?;

        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        Ok(Self {
            session,
            api_base_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            data_dir,
        })
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }

    pub fn cookie_path(&self) -> PathBuf {
        self.data_dir.join("cookies.json")
    }
}

fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("kr", "OksHouse", "okshouse-admin")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .context("Could not determine a data directory, pass --data-dir")
}
