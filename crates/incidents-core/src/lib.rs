//! Core types and trait definitions for the incident log.
//!
//! Free of HTTP, database and spreadsheet dependencies. All other crates
//! depend on it.

pub mod attachment;
pub mod error;
pub mod incident;
pub mod pupil;
pub mod reconcile;
pub mod store;

pub use error::{Error, Result};
