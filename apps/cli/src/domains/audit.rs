use anyhow::Result;
use bk_core::service::AuditEntry;
use uuid::Uuid;

use crate::context::Context;
use crate::util::prelude::*;

pub async fn run(ctx: &Context, workspace_id: Uuid, limit: u64) -> Result<()> {
	let out = execute!(ctx
		.service
		.list_audit_log(&ctx.principal, workspace_id, limit));
	print_output!(ctx, &out, |o: &Vec<AuditEntry>| {
		for e in o {
			let outcome = e.error_code.as_deref().unwrap_or("ok");
			println!(
				"{} {:<24} {:?} {} by {}",
				e.created_at, e.action, e.status, outcome, e.principal_id
			);
		}
	});
	Ok(())
}
