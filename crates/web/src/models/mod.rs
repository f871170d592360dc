//! Domain models for the marketplace.

pub mod product;
pub mod session;
pub mod user;

pub use product::Product;
pub use session::{CurrentUser, keys as session_keys};
pub use user::{SellerProfile, User};
