//! Application layer - use-case handlers composed from ports.

pub mod handlers;
