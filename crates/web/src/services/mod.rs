//! Business logic services.
//!
//! Services sit between the HTTP routes and the repositories. Routes stay
//! thin; the rules (credential checks, ownership, the two-phase image
//! create) live here.

pub mod auth;
pub mod catalog;
pub mod storage;
