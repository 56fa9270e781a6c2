//! Use-case handlers, grouped by the part of the system they drive.

pub mod account;
pub mod billing;
pub mod catalog;
pub mod subscription;
