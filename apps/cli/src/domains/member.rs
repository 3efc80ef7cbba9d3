use anyhow::Result;
use bk_core::domain::{Member, Role};
use clap::Subcommand;
use uuid::Uuid;

use crate::context::Context;
use crate::util::prelude::*;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum RoleArg {
	Owner,
	Admin,
	Member,
	ReadOnly,
}

impl From<RoleArg> for Role {
	fn from(role: RoleArg) -> Self {
		match role {
			RoleArg::Owner => Role::Owner,
			RoleArg::Admin => Role::Admin,
			RoleArg::Member => Role::Member,
			RoleArg::ReadOnly => Role::ReadOnly,
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum MemberCmd {
	/// List members of a workspace
	List { workspace_id: Uuid },
	/// Add a principal to a workspace
	Add {
		workspace_id: Uuid,
		principal_id: Uuid,
		#[arg(long, value_enum, default_value = "member")]
		role: RoleArg,
	},
	/// Change a member's role
	SetRole {
		workspace_id: Uuid,
		principal_id: Uuid,
		#[arg(value_enum)]
		role: RoleArg,
	},
	/// Remove a member
	Remove { workspace_id: Uuid, principal_id: Uuid },
}

fn print_member(m: &Member) {
	println!("- {} [{}] since {}", m.principal_id, m.role, m.joined_at);
}

pub async fn run(ctx: &Context, cmd: MemberCmd) -> Result<()> {
	let svc = &ctx.service;
	let me = &ctx.principal;

	match cmd {
		MemberCmd::List { workspace_id } => {
			let out = execute!(svc.list_members(me, workspace_id));
			print_output!(ctx, &out, |o: &Vec<Member>| o.iter().for_each(print_member));
		}
		MemberCmd::Add {
			workspace_id,
			principal_id,
			role,
		} => {
			let out = execute!(svc.add_member(me, workspace_id, principal_id, role.into()));
			print_output!(ctx, &out, print_member);
		}
		MemberCmd::SetRole {
			workspace_id,
			principal_id,
			role,
		} => {
			let out = execute!(svc.change_member_role(me, workspace_id, principal_id, role.into()));
			print_output!(ctx, &out, print_member);
		}
		MemberCmd::Remove {
			workspace_id,
			principal_id,
		} => {
			execute!(svc.remove_member(me, workspace_id, principal_id));
			print_output!(ctx, &principal_id, |id: &Uuid| {
				println!("Removed member {id}");
			});
		}
	}
	Ok(())
}
