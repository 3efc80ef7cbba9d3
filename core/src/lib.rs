//! Tenant-scoped inventory core.
//!
//! Physical storage boxes live in a per-workspace hierarchy of locations and
//! are labelled with pre-printed QR codes. [`InventoryService`] is the only
//! entry point callers need: it authorizes every request against workspace
//! membership, runs each mutation in one transaction and reports failures
//! through [`InventoryError`].

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod service;

pub use config::AppConfig;
pub use error::{EntityKind, ErrorCode, InventoryError, InventoryResult};
pub use infra::{
	db::Database,
	event::{Event, EventBus, EventSubscriber, ResourceType},
};
pub use service::InventoryService;
