//! Core types and lifecycle logic for summons tracking.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage and notification transports are reached through the
//! [`store::SummonsStore`] and [`notify::Dispatcher`] traits.

pub mod elapsed;
pub mod error;
pub mod history;
pub mod machine;
pub mod notify;
pub mod progress;
pub mod service;
pub mod store;
pub mod summons;

pub use error::{Error, Result};
