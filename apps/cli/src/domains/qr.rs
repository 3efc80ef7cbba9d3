use anyhow::Result;
use bk_core::domain::{QrCode, QrState, QrStatus};
use clap::Subcommand;
use uuid::Uuid;

use crate::context::Context;
use crate::util::prelude::*;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StatusArg {
	Generated,
	Assigned,
}

#[derive(Subcommand, Debug)]
pub enum QrCmd {
	/// Generate a batch of printable codes
	Generate {
		workspace_id: Uuid,
		#[arg(long, default_value_t = 10, allow_negative_numbers = true)]
		quantity: i64,
	},
	/// Look up a scanned short code
	Resolve { short_code: String },
	/// List a workspace's codes
	List {
		workspace_id: Uuid,
		#[arg(long, value_enum)]
		status: Option<StatusArg>,
	},
}

fn print_code(c: &QrCode) {
	match c.state {
		QrState::Generated => println!("{} {} unassigned", c.short_code, c.id),
		QrState::Assigned { box_id } => println!("{} {} -> box {}", c.short_code, c.id, box_id),
	}
}

pub async fn run(ctx: &Context, cmd: QrCmd) -> Result<()> {
	let svc = &ctx.service;
	let me = &ctx.principal;

	match cmd {
		QrCmd::Generate {
			workspace_id,
			quantity,
		} => {
			let out = execute!(svc.generate_qr_batch(me, workspace_id, quantity));
			print_output!(ctx, &out, |o: &Vec<QrCode>| o.iter().for_each(print_code));
		}
		QrCmd::Resolve { short_code } => {
			let out = execute!(svc.resolve_qr_code(me, &short_code));
			print_output!(ctx, &out, print_code);
		}
		QrCmd::List {
			workspace_id,
			status,
		} => {
			let status = status.map(|s| match s {
				StatusArg::Generated => QrStatus::Generated,
				StatusArg::Assigned => QrStatus::Assigned,
			});
			let out = execute!(svc.list_qr_codes(me, workspace_id, status));
			print_output!(ctx, &out, |o: &Vec<QrCode>| o.iter().for_each(print_code));
		}
	}
	Ok(())
}
