use anyhow::Result;
use clap::Subcommand;
use uuid::Uuid;

use crate::context::Context;
use crate::util::prelude::*;

#[derive(Subcommand, Debug)]
pub enum WorkspaceCmd {
	/// Create a workspace owned by the current principal
	Create { name: String },
	/// List workspaces the current principal belongs to
	List,
	/// Show one workspace
	Show { workspace_id: Uuid },
	/// Rename a workspace
	Rename { workspace_id: Uuid, name: String },
	/// Delete a workspace and everything in it
	Delete { workspace_id: Uuid },
}

pub async fn run(ctx: &Context, cmd: WorkspaceCmd) -> Result<()> {
	let svc = &ctx.service;
	let me = &ctx.principal;

	match cmd {
		WorkspaceCmd::Create { name } => {
			let out = execute!(svc.create_workspace(me, &name));
			print_output!(ctx, &out, |w: &bk_core::domain::Workspace| {
				println!("Created workspace {} ({})", w.name, w.id);
			});
		}
		WorkspaceCmd::List => {
			let out = execute!(svc.list_workspaces_for(me));
			print_output!(ctx, &out, |o: &Vec<bk_core::domain::WorkspaceMembership>| {
				if o.is_empty() {
					println!("No workspaces found");
					return;
				}
				for m in o {
					println!("- {} {} [{}]", m.workspace.id, m.workspace.name, m.role);
				}
			});
		}
		WorkspaceCmd::Show { workspace_id } => {
			let out = execute!(svc.get_workspace(me, workspace_id));
			print_output!(ctx, &out, |w: &bk_core::domain::Workspace| {
				println!("{} ({})", w.name, w.id);
				println!("  owner:   {}", w.owner_id);
				println!("  created: {}", w.created_at);
			});
		}
		WorkspaceCmd::Rename { workspace_id, name } => {
			let out = execute!(svc.rename_workspace(me, workspace_id, &name));
			print_output!(ctx, &out, |w: &bk_core::domain::Workspace| {
				println!("Renamed workspace {} to {}", w.id, w.name);
			});
		}
		WorkspaceCmd::Delete { workspace_id } => {
			execute!(svc.delete_workspace(me, workspace_id));
			print_output!(ctx, &workspace_id, |id: &Uuid| {
				println!("Deleted workspace {id}");
			});
		}
	}
	Ok(())
}
