use anyhow::Result;
use bk_core::domain::{Location, LocationDetails};
use clap::Subcommand;
use uuid::Uuid;

use crate::context::Context;
use crate::util::prelude::*;

#[derive(Subcommand, Debug)]
pub enum LocationCmd {
	/// Create a location, at the root or under a parent
	Create {
		workspace_id: Uuid,
		name: String,
		#[arg(long)]
		parent: Option<Uuid>,
	},
	/// List live children of a location (roots by default)
	List {
		workspace_id: Uuid,
		#[arg(long)]
		parent: Option<Uuid>,
	},
	/// Show a location with its breadcrumb trail
	Show { workspace_id: Uuid, location_id: Uuid },
	/// Rename a location
	Rename {
		workspace_id: Uuid,
		location_id: Uuid,
		name: String,
	},
	/// Delete a location and its subtree; boxes inside become unassigned
	Delete { workspace_id: Uuid, location_id: Uuid },
}

fn print_location(l: &Location) {
	println!("- {} {} (depth {})", l.id, l.name, l.depth());
}

pub async fn run(ctx: &Context, cmd: LocationCmd) -> Result<()> {
	let svc = &ctx.service;
	let me = &ctx.principal;

	match cmd {
		LocationCmd::Create {
			workspace_id,
			name,
			parent,
		} => {
			let out = execute!(svc.create_location(me, workspace_id, parent, &name));
			print_output!(ctx, &out, print_location);
		}
		LocationCmd::List {
			workspace_id,
			parent,
		} => {
			let out = execute!(svc.list_locations(me, workspace_id, parent));
			print_output!(ctx, &out, |o: &Vec<Location>| {
				if o.is_empty() {
					println!("No locations found");
					return;
				}
				o.iter().for_each(print_location);
			});
		}
		LocationCmd::Show {
			workspace_id,
			location_id,
		} => {
			let out = execute!(svc.get_location(me, workspace_id, location_id));
			print_output!(ctx, &out, |d: &LocationDetails| {
				let mut trail: Vec<&str> = d.breadcrumbs.iter().map(|b| b.name.as_str()).collect();
				trail.push(&d.location.name);
				println!("{}", trail.join(" / "));
				println!("  id: {}", d.location.id);
			});
		}
		LocationCmd::Rename {
			workspace_id,
			location_id,
			name,
		} => {
			let out = execute!(svc.rename_location(me, workspace_id, location_id, &name));
			print_output!(ctx, &out, print_location);
		}
		LocationCmd::Delete {
			workspace_id,
			location_id,
		} => {
			execute!(svc.soft_delete_location(me, workspace_id, location_id));
			print_output!(ctx, &location_id, |id: &Uuid| {
				println!("Deleted location {id}");
			});
		}
	}
	Ok(())
}
