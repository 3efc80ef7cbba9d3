//! Workspace membership roles

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a principal holds inside a workspace, most privileged first
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Role {
	#[sea_orm(string_value = "owner")]
	Owner,
	#[sea_orm(string_value = "admin")]
	Admin,
	#[sea_orm(string_value = "member")]
	Member,
	#[sea_orm(string_value = "read_only")]
	ReadOnly,
}

impl Role {
	fn rank(&self) -> u8 {
		match self {
			Role::Owner => 3,
			Role::Admin => 2,
			Role::Member => 1,
			Role::ReadOnly => 0,
		}
	}

	/// Whether this role grants at least the privileges of `required`
	pub fn permits(&self, required: Role) -> bool {
		self.rank() >= required.rank()
	}

	/// Read-only members can browse but never mutate
	pub fn can_mutate(&self) -> bool {
		self.permits(Role::Member)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Owner => "owner",
			Role::Admin => "admin",
			Role::Member => "member",
			Role::ReadOnly => "read_only",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for Role {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"owner" => Ok(Role::Owner),
			"admin" => Ok(Role::Admin),
			"member" => Ok(Role::Member),
			"read_only" | "read-only" | "readonly" => Ok(Role::ReadOnly),
			other => Err(format!("unknown role: {other}")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn role_ordering() {
		assert!(Role::Owner.permits(Role::Admin));
		assert!(Role::Admin.permits(Role::Member));
		assert!(Role::Member.permits(Role::ReadOnly));
		assert!(!Role::Member.permits(Role::Admin));
		assert!(!Role::ReadOnly.permits(Role::Member));
		assert!(Role::ReadOnly.permits(Role::ReadOnly));
	}

	#[test]
	fn read_only_cannot_mutate() {
		assert!(!Role::ReadOnly.can_mutate());
		assert!(Role::Member.can_mutate());
	}

	#[test]
	fn parse_role() {
		assert_eq!("read-only".parse::<Role>().unwrap(), Role::ReadOnly);
		assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
		assert!("guest".parse::<Role>().is_err());
	}
}
