//! Nani Connect Core - Shared types library.
//!
//! This crate provides common types used across all Nani Connect components:
//! - `web` - The marketplace web application
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure computation - no I/O, no
//! database access, no HTTP handling. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and roles
//! - [`geo`] - Coordinates and great-circle distance for nearby-seller lookup

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod geo;
pub mod types;

pub use geo::{Coordinates, NEARBY_RADIUS_KM, haversine_km};
pub use types::*;
