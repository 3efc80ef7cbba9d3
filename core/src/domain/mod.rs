//! Domain types shared by the inventory services

pub mod location;
pub mod principal;
pub mod qr_code;
pub mod role;
pub mod short_code;
pub mod storage_box;
pub mod workspace;

pub use location::{
	Breadcrumb, Location, LocationDetails, LocationState, MaterializedPath, MAX_LOCATION_DEPTH,
};
pub use principal::Principal;
pub use qr_code::{QrCode, QrState, QrStatus, MAX_BATCH_QUANTITY, MIN_BATCH_QUANTITY};
pub use role::Role;
pub use short_code::{RandomShortCodes, ShortCodeSource};
pub use storage_box::{
	BoxDetails, BoxSearch, BoxUpdate, LocationFilter, NewBox, Page, StorageBox,
};
pub use workspace::{Member, Workspace, WorkspaceMembership};
