use anyhow::{Context as _, Result};
use bk_core::{config::default_data_dir, domain::Principal, AppConfig, InventoryService};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

mod context;
mod domains;
mod util;

use crate::context::{Context, OutputFormat};
use crate::domains::{
	location::LocationCmd, member::MemberCmd, qr::QrCmd, storage_box::BoxCmd,
	workspace::WorkspaceCmd,
};

#[derive(Parser, Debug)]
#[command(name = "bk", about = "Boxkeeper inventory CLI")]
struct Cli {
	/// Path to the data directory
	#[arg(long, env = "BOXKEEPER_DATA_DIR")]
	data_dir: Option<PathBuf>,

	/// Principal the request is made as
	#[arg(long, env = "BK_PRINCIPAL")]
	principal: Uuid,

	/// Output format
	#[arg(long, value_enum, default_value = "human")]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Workspace operations
	#[command(subcommand)]
	Workspace(WorkspaceCmd),
	/// Membership operations
	#[command(subcommand)]
	Member(MemberCmd),
	/// Location operations
	#[command(subcommand)]
	Location(LocationCmd),
	/// Box operations
	#[command(subcommand)]
	Box(BoxCmd),
	/// QR code operations
	#[command(subcommand)]
	Qr(QrCmd),
	/// Recent mutations in a workspace
	Audit {
		workspace_id: Uuid,
		#[arg(long, default_value_t = 50)]
		limit: u64,
	},
}

fn init_tracing(default_level: &str) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("{default_level},bk_core=debug")));

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_writer(std::io::stderr).with_target(false))
		.init();
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let data_dir = match cli.data_dir {
		Some(dir) => dir,
		None => default_data_dir()?,
	};
	let config = AppConfig::load_from(&data_dir)
		.with_context(|| format!("Failed to load config from {}", data_dir.display()))?;
	init_tracing(&config.log_level);

	let service = InventoryService::open(&config)
		.await
		.map_err(util::error::CliError::from)
		.context("Failed to open inventory database")?;
	let ctx = Context::new(service, Principal::new(cli.principal), cli.format);

	match cli.command {
		Commands::Workspace(cmd) => domains::workspace::run(&ctx, cmd).await,
		Commands::Member(cmd) => domains::member::run(&ctx, cmd).await,
		Commands::Location(cmd) => domains::location::run(&ctx, cmd).await,
		Commands::Box(cmd) => domains::storage_box::run(&ctx, cmd).await,
		Commands::Qr(cmd) => domains::qr::run(&ctx, cmd).await,
		Commands::Audit {
			workspace_id,
			limit,
		} => domains::audit::run(&ctx, workspace_id, limit).await,
	}
}
