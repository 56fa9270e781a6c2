//! Domain layer - entities, value objects, and domain errors.

pub mod account;
pub mod catalog;
pub mod foundation;
pub mod subscription;
