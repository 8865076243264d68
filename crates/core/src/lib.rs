//! Orchard Core - Shared types library.
//!
//! This crate provides common types used across all Orchard components:
//! - `recommendations` - Recommendation engine and its Postgres stores
//! - `cli` - Command-line tools for migrations, seeding, and recommendations
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, the user identity, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
