//! Application configuration

use super::Migrate;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "boxkeeper.json";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
	/// Config schema version
	pub version: u32,

	/// Data directory path
	pub data_dir: PathBuf,

	/// SQLite database file name inside the data directory
	#[serde(default = "default_database_file")]
	pub database_file: String,

	/// Upper bound on pooled database connections
	#[serde(default = "default_max_connections")]
	pub max_connections: u32,

	/// Logging level
	pub log_level: String,

	/// Search paging
	#[serde(default)]
	pub search: SearchConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
	pub default_page_size: u64,
	pub max_page_size: u64,
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			default_page_size: 25,
			max_page_size: 100,
		}
	}
}

impl SearchConfig {
	/// Resolve a requested page size into the accepted range
	pub fn clamp_page_size(&self, requested: Option<u64>) -> u64 {
		requested
			.unwrap_or(self.default_page_size)
			.clamp(1, self.max_page_size.max(1))
	}
}

fn default_database_file() -> String {
	"inventory.db".to_string()
}

fn default_max_connections() -> u32 {
	5
}

impl AppConfig {
	/// Load configuration from a specific data directory
	pub fn load_from(data_dir: &Path) -> Result<Self> {
		let config_path = data_dir.join(CONFIG_FILE_NAME);

		if config_path.exists() {
			info!("Loading config from {:?}", config_path);
			let json = fs::read_to_string(&config_path)?;
			let mut config: AppConfig = serde_json::from_str(&json)?;

			// Apply migrations if needed
			if config.version < Self::target_version() {
				info!(
					"Migrating config from v{} to v{}",
					config.version,
					Self::target_version()
				);
				config.migrate()?;
				config.save()?;
			}

			Ok(config)
		} else {
			warn!("No config found, creating default at {:?}", config_path);
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		}
	}

	/// Create default configuration with specific data directory
	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: Self::target_version(),
			data_dir,
			database_file: default_database_file(),
			max_connections: default_max_connections(),
			log_level: "info".to_string(),
			search: SearchConfig::default(),
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		// Ensure directory exists
		fs::create_dir_all(&self.data_dir)?;

		let config_path = self.data_dir.join(CONFIG_FILE_NAME);
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json)?;
		info!("Saved config to {:?}", config_path);
		Ok(())
	}

	/// Full path of the SQLite database
	pub fn database_path(&self) -> PathBuf {
		self.data_dir.join(&self.database_file)
	}
}

impl Migrate for AppConfig {
	fn target_version() -> u32 {
		2 // Current schema version
	}

	fn migrate(&mut self) -> Result<()> {
		match self.version {
			0 | 1 => {
				// v2 split search paging out of the top level; serde defaults fill it in
				self.version = 2;
				Ok(())
			}
			2 => Ok(()), // Already at target version
			v => Err(anyhow!("Unknown config version: {}", v)),
		}
	}
}
