//! Submarket - Subscription Marketplace Backend
//!
//! Coordinates the subscription lifecycle across the plan catalog, account
//! documents, and the external payment gateway.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
