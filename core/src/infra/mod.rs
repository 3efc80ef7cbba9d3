//! Infrastructure: persistence and in-process event delivery

pub mod db;
pub mod event;
