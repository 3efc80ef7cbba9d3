pub mod audit;
pub mod location;
pub mod member;
pub mod qr;
pub mod storage_box;
pub mod workspace;
