//! Core types for Orchard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod identity;
pub mod price;

pub use id::*;
pub use identity::UserIdentity;
pub use price::{CurrencyCode, Price};
