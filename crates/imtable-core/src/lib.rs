//! Core domain model for imtable.
//!
//! This crate defines the lookup-table text model (Entry, Definition,
//! TableSource), the build manifest, and the SQLite schema of the
//! packaged table artifact.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod manifest;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
