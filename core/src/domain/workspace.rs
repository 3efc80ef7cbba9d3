//! Workspace (tenant) and membership types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
	pub id: Uuid,
	pub name: String,
	/// Principal that created the workspace
	pub owner_id: Uuid,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A workspace as seen by one of its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceMembership {
	pub workspace: Workspace,
	pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
	pub workspace_id: Uuid,
	pub principal_id: Uuid,
	pub role: Role,
	pub joined_at: DateTime<Utc>,
}
