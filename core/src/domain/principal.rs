//! Authenticated caller identity
//!
//! Credentials are verified by an external identity provider. The core only
//! ever receives the already-resolved principal id and its claims.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
	pub id: Uuid,
	#[serde(default)]
	pub claims: BTreeMap<String, serde_json::Value>,
}

impl Principal {
	pub fn new(id: Uuid) -> Self {
		Self {
			id,
			claims: BTreeMap::new(),
		}
	}

	pub fn with_claim(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.claims.insert(key.into(), value);
		self
	}

	/// Display name advertised by the identity provider, if any
	pub fn display_name(&self) -> Option<&str> {
		self.claims.get("name").and_then(|v| v.as_str())
	}
}
