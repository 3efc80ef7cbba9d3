use anyhow::Result;
use bk_core::domain::{
	BoxDetails, BoxSearch, BoxUpdate, LocationFilter, NewBox, Page, StorageBox,
};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::context::Context;
use crate::util::prelude::*;

#[derive(Args, Debug)]
pub struct BoxCreateArgs {
	pub workspace_id: Uuid,
	pub name: String,
	#[arg(long)]
	pub description: Option<String>,
	/// Repeat for several tags
	#[arg(long = "tag")]
	pub tags: Vec<String>,
	#[arg(long)]
	pub location: Option<Uuid>,
	/// Claim a generated QR code for this box
	#[arg(long)]
	pub qr_code: Option<Uuid>,
}

impl From<BoxCreateArgs> for NewBox {
	fn from(args: BoxCreateArgs) -> Self {
		NewBox {
			name: args.name,
			description: args.description,
			tags: args.tags,
			location_id: args.location,
			qr_code_id: args.qr_code,
		}
	}
}

#[derive(Args, Debug)]
pub struct BoxEditArgs {
	pub workspace_id: Uuid,
	pub box_id: Uuid,
	#[arg(long)]
	pub name: Option<String>,
	#[arg(long, conflicts_with = "clear_description")]
	pub description: Option<String>,
	#[arg(long)]
	pub clear_description: bool,
	/// Replace all tags; repeat for several
	#[arg(long = "tag")]
	pub tags: Vec<String>,
	#[arg(long)]
	pub clear_tags: bool,
}

impl From<BoxEditArgs> for BoxUpdate {
	fn from(args: BoxEditArgs) -> Self {
		let description = if args.clear_description {
			Some(None)
		} else {
			args.description.map(Some)
		};
		let tags = if args.clear_tags {
			Some(Vec::new())
		} else if args.tags.is_empty() {
			None
		} else {
			Some(args.tags)
		};

		BoxUpdate {
			name: args.name,
			description,
			tags,
		}
	}
}

#[derive(Args, Debug)]
pub struct BoxSearchArgs {
	pub workspace_id: Uuid,
	pub query: Option<String>,
	#[arg(long, conflicts_with = "unassigned")]
	pub location: Option<Uuid>,
	#[arg(long)]
	pub unassigned: bool,
	#[arg(long, default_value_t = 1)]
	pub page: u64,
	#[arg(long)]
	pub page_size: Option<u64>,
}

impl From<BoxSearchArgs> for BoxSearch {
	fn from(args: BoxSearchArgs) -> Self {
		let location = match (args.location, args.unassigned) {
			(Some(id), _) => LocationFilter::At(id),
			(None, true) => LocationFilter::Unassigned,
			(None, false) => LocationFilter::Any,
		};

		BoxSearch {
			query: args.query,
			location,
			page: args.page,
			page_size: args.page_size,
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum BoxCmd {
	/// Create a box
	Create(BoxCreateArgs),
	/// Show a box with its location and QR code
	Show { workspace_id: Uuid, box_id: Uuid },
	/// Move a box; omit --to to unassign it
	Move {
		workspace_id: Uuid,
		box_id: Uuid,
		#[arg(long)]
		to: Option<Uuid>,
	},
	/// Rename, describe or retag a box
	Edit(BoxEditArgs),
	/// Attach a generated QR code, releasing the current one
	Label {
		workspace_id: Uuid,
		box_id: Uuid,
		qr_code_id: Uuid,
	},
	/// Delete a box; its QR code becomes reusable
	Delete { workspace_id: Uuid, box_id: Uuid },
	/// Search boxes
	Search(BoxSearchArgs),
}

fn print_box(b: &StorageBox) {
	let place = b
		.location_id
		.map(|l| l.to_string())
		.unwrap_or_else(|| "unassigned".to_string());
	println!("- [{}] {} ({}) @ {}", b.short_code, b.name, b.id, place);
	if !b.tags.is_empty() {
		println!("    tags: {}", b.tags.join(", "));
	}
}

pub async fn run(ctx: &Context, cmd: BoxCmd) -> Result<()> {
	let svc = &ctx.service;
	let me = &ctx.principal;

	match cmd {
		BoxCmd::Create(args) => {
			let workspace_id = args.workspace_id;
			let out = execute!(svc.create_box(me, workspace_id, args.into()));
			print_output!(ctx, &out, print_box);
		}
		BoxCmd::Show {
			workspace_id,
			box_id,
		} => {
			let out = execute!(svc.get_box(me, workspace_id, box_id));
			print_output!(ctx, &out, |d: &BoxDetails| {
				print_box(&d.storage_box);
				if let Some(description) = &d.storage_box.description {
					println!("    {description}");
				}
				if let Some(location) = &d.location {
					println!("    location: {}", location.name);
				}
				if let Some(code) = &d.qr_code {
					println!("    QR code: {}", code.short_code);
				}
			});
		}
		BoxCmd::Move {
			workspace_id,
			box_id,
			to,
		} => {
			let out = execute!(svc.move_box(me, workspace_id, box_id, to));
			print_output!(ctx, &out, print_box);
		}
		BoxCmd::Edit(args) => {
			let (workspace_id, box_id) = (args.workspace_id, args.box_id);
			let out = execute!(svc.rename_or_retag(me, workspace_id, box_id, args.into()));
			print_output!(ctx, &out, print_box);
		}
		BoxCmd::Label {
			workspace_id,
			box_id,
			qr_code_id,
		} => {
			let out = execute!(svc.assign_qr_code(me, workspace_id, box_id, qr_code_id));
			print_output!(ctx, &out, |c: &bk_core::domain::QrCode| {
				println!("Box {box_id} now carries {}", c.short_code);
			});
		}
		BoxCmd::Delete {
			workspace_id,
			box_id,
		} => {
			execute!(svc.delete_box(me, workspace_id, box_id));
			print_output!(ctx, &box_id, |id: &Uuid| {
				println!("Deleted box {id}");
			});
		}
		BoxCmd::Search(args) => {
			let workspace_id = args.workspace_id;
			let search: BoxSearch = args.into();
			let out = execute!(svc.search_boxes(me, workspace_id, &search));
			print_output!(ctx, &out, |p: &Page<StorageBox>| {
				p.items.iter().for_each(print_box);
				println!(
					"page {}/{} ({} boxes)",
					p.page,
					p.total_pages().max(1),
					p.total_items
				);
			});
		}
	}
	Ok(())
}
