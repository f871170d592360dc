//! HTTP middleware: sessions and authentication extractors.

pub mod auth;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, RequireBuyer, RequireSeller};
pub use session::create_session_layer;
