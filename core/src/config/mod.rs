//! Application configuration management

use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

pub mod app_config;

pub use app_config::AppConfig;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "BOXKEEPER_DATA_DIR";

/// Platform-specific data directory resolution
pub fn default_data_dir() -> Result<PathBuf> {
	if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
		let dir = PathBuf::from(dir);
		fs::create_dir_all(&dir)?;
		return Ok(dir);
	}

	#[cfg(target_os = "windows")]
	let dir = dirs::data_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("Boxkeeper");

	#[cfg(not(target_os = "windows"))]
	let dir = dirs::data_local_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("boxkeeper");

	// Create directory if it doesn't exist
	fs::create_dir_all(&dir)?;

	Ok(dir)
}

/// Versioned configuration files upgrade themselves in place
pub trait Migrate {
	fn target_version() -> u32;

	fn migrate(&mut self) -> Result<()>;
}
