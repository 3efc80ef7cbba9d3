//! Audit log for workspace mutations

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(AuditLog::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(AuditLog::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(AuditLog::Uuid).uuid().not_null().unique_key())
					.col(ColumnDef::new(AuditLog::WorkspaceId).uuid().not_null())
					.col(ColumnDef::new(AuditLog::ActionType).string().not_null())
					.col(ColumnDef::new(AuditLog::PrincipalId).uuid().not_null())
					.col(ColumnDef::new(AuditLog::Status).string().not_null())
					.col(
						ColumnDef::new(AuditLog::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(ColumnDef::new(AuditLog::CompletedAt).timestamp_with_time_zone())
					.col(ColumnDef::new(AuditLog::ErrorCode).string())
					.to_owned(),
			)
			.await?;

		// Audit rows outlive their workspace, so there is no foreign key here
		manager
			.create_index(
				Index::create()
					.name("idx_audit_log_workspace_created")
					.table(AuditLog::Table)
					.col(AuditLog::WorkspaceId)
					.col(AuditLog::CreatedAt)
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(AuditLog::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
enum AuditLog {
	Table,
	Id,
	Uuid,
	WorkspaceId,
	ActionType,
	PrincipalId,
	Status,
	CreatedAt,
	CompletedAt,
	ErrorCode,
}
