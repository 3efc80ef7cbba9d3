use bk_core::{ErrorCode, InventoryError};
use std::fmt;

/// An inventory error as shown to the user: stable code plus safe message
#[derive(Debug)]
pub struct CliError {
	pub code: ErrorCode,
	pub message: String,
}

impl From<InventoryError> for CliError {
	fn from(err: InventoryError) -> Self {
		tracing::debug!("Inventory call failed: {err:?}");
		Self {
			code: err.code(),
			message: err.public_message(),
		}
	}
}

impl fmt::Display for CliError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} [{}]", self.message, self.code)
	}
}

impl std::error::Error for CliError {}
