use bk_core::{domain::Principal, InventoryService};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
	Human,
	Json,
}

/// Everything a command needs: the service, who is asking, how to print
pub struct Context {
	pub service: InventoryService,
	pub principal: Principal,
	pub format: OutputFormat,
}

impl Context {
	pub fn new(service: InventoryService, principal: Principal, format: OutputFormat) -> Self {
		Self {
			service,
			principal,
			format,
		}
	}
}
