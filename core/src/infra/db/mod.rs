//! Database infrastructure using SeaORM

use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod entities;
pub mod migration;

/// Database wrapper for the inventory store
#[derive(Debug, Clone)]
pub struct Database {
	/// SeaORM database connection
	conn: DatabaseConnection,
}

impl Database {
	/// Create a new database at the specified path
	pub async fn create(path: &Path, max_connections: u32) -> Result<Self, DbErr> {
		// Ensure parent directory exists
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)
				.map_err(|e| DbErr::Custom(format!("Failed to create directory: {}", e)))?;
		}

		let db_url = format!("sqlite://{}?mode=rwc", path.display());
		let conn = SeaDatabase::connect(Self::options(db_url, max_connections)).await?;

		info!("Created new database at {:?}", path);

		Ok(Self { conn })
	}

	/// Private in-memory database, already migrated.
	///
	/// Each SQLite connection to `:memory:` is its own database, so the pool
	/// is pinned to a single connection.
	pub async fn memory() -> Result<Self, DbErr> {
		let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
		opt.max_connections(1)
			.min_connections(1)
			.connect_timeout(Duration::from_secs(8))
			.sqlx_logging(false);

		let db = Self {
			conn: SeaDatabase::connect(opt).await?,
		};
		db.migrate().await?;
		Ok(db)
	}

	/// Run migrations
	pub async fn migrate(&self) -> Result<(), DbErr> {
		migration::Migrator::up(&self.conn, None).await?;
		info!("Database migrations completed successfully");
		Ok(())
	}

	/// Get the database connection
	pub fn conn(&self) -> &DatabaseConnection {
		&self.conn
	}

	fn options(db_url: String, max_connections: u32) -> ConnectOptions {
		let mut opt = ConnectOptions::new(db_url);
		opt.max_connections(max_connections.max(1))
			.min_connections(1)
			.connect_timeout(Duration::from_secs(8))
			.sqlx_logging(false); // We'll use tracing instead
		opt
	}
}
