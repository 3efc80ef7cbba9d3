//! Initial inventory schema
//!
//! Creates the tenant, hierarchy, box and QR code tables. Every tenant row
//! references `workspaces` so a workspace teardown can never leave orphans.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		// Create workspaces table
		manager
			.create_table(
				Table::create()
					.table(Workspaces::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Workspaces::Id)
							.uuid()
							.not_null()
							.primary_key(),
					)
					.col(ColumnDef::new(Workspaces::Name).string().not_null())
					.col(ColumnDef::new(Workspaces::OwnerId).uuid().not_null())
					.col(
						ColumnDef::new(Workspaces::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(
						ColumnDef::new(Workspaces::UpdatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.to_owned(),
			)
			.await?;

		// Create workspace_members table
		manager
			.create_table(
				Table::create()
					.table(WorkspaceMembers::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(WorkspaceMembers::WorkspaceId)
							.uuid()
							.not_null(),
					)
					.col(
						ColumnDef::new(WorkspaceMembers::PrincipalId)
							.uuid()
							.not_null(),
					)
					.col(ColumnDef::new(WorkspaceMembers::Role).string().not_null())
					.col(
						ColumnDef::new(WorkspaceMembers::JoinedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.primary_key(
						Index::create()
							.col(WorkspaceMembers::WorkspaceId)
							.col(WorkspaceMembers::PrincipalId),
					)
					.foreign_key(
						ForeignKey::create()
							.from(WorkspaceMembers::Table, WorkspaceMembers::WorkspaceId)
							.to(Workspaces::Table, Workspaces::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;

		// Create locations table
		manager
			.create_table(
				Table::create()
					.table(Locations::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Locations::Id)
							.uuid()
							.not_null()
							.primary_key(),
					)
					.col(ColumnDef::new(Locations::WorkspaceId).uuid().not_null())
					.col(ColumnDef::new(Locations::ParentId).uuid())
					.col(ColumnDef::new(Locations::Name).string().not_null())
					.col(ColumnDef::new(Locations::Path).text().not_null())
					.col(ColumnDef::new(Locations::Depth).integer().not_null())
					.col(ColumnDef::new(Locations::DeletedAt).timestamp_with_time_zone())
					.col(
						ColumnDef::new(Locations::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(
						ColumnDef::new(Locations::UpdatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.foreign_key(
						ForeignKey::create()
							.from(Locations::Table, Locations::WorkspaceId)
							.to(Workspaces::Table, Workspaces::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.foreign_key(
						ForeignKey::create()
							.from(Locations::Table, Locations::ParentId)
							.to(Locations::Table, Locations::Id),
					)
					.to_owned(),
			)
			.await?;

		// Create boxes table
		manager
			.create_table(
				Table::create()
					.table(Boxes::Table)
					.if_not_exists()
					.col(ColumnDef::new(Boxes::Id).uuid().not_null().primary_key())
					.col(ColumnDef::new(Boxes::WorkspaceId).uuid().not_null())
					.col(ColumnDef::new(Boxes::LocationId).uuid())
					.col(ColumnDef::new(Boxes::ShortCode).string().not_null())
					.col(ColumnDef::new(Boxes::Name).string().not_null())
					.col(ColumnDef::new(Boxes::Description).text())
					.col(ColumnDef::new(Boxes::NameFolded).string().not_null())
					.col(ColumnDef::new(Boxes::DescriptionFolded).text())
					.col(
						ColumnDef::new(Boxes::Tags)
							.text()
							.not_null()
							.default("[]"),
					)
					.col(
						ColumnDef::new(Boxes::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(
						ColumnDef::new(Boxes::UpdatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.foreign_key(
						ForeignKey::create()
							.from(Boxes::Table, Boxes::WorkspaceId)
							.to(Workspaces::Table, Workspaces::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.foreign_key(
						ForeignKey::create()
							.from(Boxes::Table, Boxes::LocationId)
							.to(Locations::Table, Locations::Id)
							.on_delete(ForeignKeyAction::SetNull),
					)
					.to_owned(),
			)
			.await?;

		// Create qr_codes table. The check keeps status and box reference in lockstep,
		// and the box reference has no delete action so a box can't vanish under a
		// code that still points at it.
		manager
			.create_table(
				Table::create()
					.table(QrCodes::Table)
					.if_not_exists()
					.col(ColumnDef::new(QrCodes::Id).uuid().not_null().primary_key())
					.col(ColumnDef::new(QrCodes::WorkspaceId).uuid().not_null())
					.col(
						ColumnDef::new(QrCodes::ShortCode)
							.string()
							.not_null()
							.unique_key(),
					)
					.col(
						ColumnDef::new(QrCodes::Status)
							.string()
							.not_null()
							.default("generated"),
					)
					.col(ColumnDef::new(QrCodes::BoxId).uuid().unique_key())
					.col(
						ColumnDef::new(QrCodes::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(
						ColumnDef::new(QrCodes::UpdatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.check(Expr::cust(
						"(status = 'assigned') = (box_id IS NOT NULL)",
					))
					.foreign_key(
						ForeignKey::create()
							.from(QrCodes::Table, QrCodes::WorkspaceId)
							.to(Workspaces::Table, Workspaces::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.foreign_key(
						ForeignKey::create()
							.from(QrCodes::Table, QrCodes::BoxId)
							.to(Boxes::Table, Boxes::Id),
					)
					.to_owned(),
			)
			.await?;

		// Live siblings must have distinct names. Roots have no parent, so the
		// parent is folded to '' to make NULLs collide.
		manager
			.get_connection()
			.execute_unprepared(
				"CREATE UNIQUE INDEX IF NOT EXISTS idx_locations_live_sibling_name \
				 ON locations (workspace_id, IFNULL(parent_id, ''), name) \
				 WHERE deleted_at IS NULL",
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_locations_workspace_parent")
					.table(Locations::Table)
					.col(Locations::WorkspaceId)
					.col(Locations::ParentId)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_locations_path")
					.table(Locations::Table)
					.col(Locations::Path)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_boxes_workspace_short_code")
					.table(Boxes::Table)
					.col(Boxes::WorkspaceId)
					.col(Boxes::ShortCode)
					.unique()
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_boxes_location")
					.table(Boxes::Table)
					.col(Boxes::LocationId)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_qr_codes_workspace_status")
					.table(QrCodes::Table)
					.col(QrCodes::WorkspaceId)
					.col(QrCodes::Status)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_workspace_members_principal")
					.table(WorkspaceMembers::Table)
					.col(WorkspaceMembers::PrincipalId)
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		// Drop tables in reverse order of creation
		manager
			.drop_table(Table::drop().table(QrCodes::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Boxes::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Locations::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(WorkspaceMembers::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Workspaces::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
enum Workspaces {
	Table,
	Id,
	Name,
	OwnerId,
	CreatedAt,
	UpdatedAt,
}

#[derive(DeriveIden)]
enum WorkspaceMembers {
	Table,
	WorkspaceId,
	PrincipalId,
	Role,
	JoinedAt,
}

#[derive(DeriveIden)]
enum Locations {
	Table,
	Id,
	WorkspaceId,
	ParentId,
	Name,
	Path,
	Depth,
	DeletedAt,
	CreatedAt,
	UpdatedAt,
}

#[derive(DeriveIden)]
enum Boxes {
	Table,
	Id,
	WorkspaceId,
	LocationId,
	ShortCode,
	Name,
	Description,
	NameFolded,
	DescriptionFolded,
	Tags,
	CreatedAt,
	UpdatedAt,
}

#[derive(DeriveIden)]
enum QrCodes {
	Table,
	Id,
	WorkspaceId,
	ShortCode,
	Status,
	BoxId,
	CreatedAt,
	UpdatedAt,
}
