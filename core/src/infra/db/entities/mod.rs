//! Sea-ORM entity definitions
//!
//! These map our domain models to database tables.

pub mod audit_log;
pub mod location;
pub mod qr_code;
pub mod storage_box;
pub mod workspace;
pub mod workspace_member;

// Re-export all entities
pub use audit_log::Entity as AuditLog;
pub use location::Entity as Location;
pub use qr_code::Entity as QrCode;
pub use storage_box::Entity as StorageBox;
pub use workspace::Entity as Workspace;
pub use workspace_member::Entity as WorkspaceMember;

// Re-export active models for easy access
pub use audit_log::ActiveModel as AuditLogActive;
pub use location::ActiveModel as LocationActive;
pub use qr_code::ActiveModel as QrCodeActive;
pub use storage_box::ActiveModel as StorageBoxActive;
pub use workspace::ActiveModel as WorkspaceActive;
pub use workspace_member::ActiveModel as WorkspaceMemberActive;
