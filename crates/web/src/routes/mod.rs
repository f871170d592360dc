//! HTTP route handlers for the marketplace.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Role router (redirects by session role)
//! GET  /dashboard              - Role router (same as /)
//! GET  /health                 - Health check
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Buyer (requires buyer session)
//! GET  /buyer                  - Buyer dashboard (search, cart, nearby sellers)
//! GET  /buyer/products         - Product grid fragment (HTMX live search)
//!
//! # Seller (requires seller session)
//! GET  /seller                 - Seller dashboard (own products)
//! POST /seller/products        - Create product (multipart, optional image)
//! POST /seller/products/{id}   - Update product (multipart)
//! POST /seller/products/{id}/delete - Delete product
//!
//! # Cart (HTMX fragments, buyer session)
//! GET  /cart                   - Cart items fragment
//! POST /cart/add               - Add product snapshot (triggers cart-updated)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Nearby sellers (HTMX fragment, buyer session)
//! GET  /sellers/nearby         - Sellers within 2 km of ?lat=&lon=
//! ```

pub mod auth;
pub mod buyer;
pub mod cart;
pub mod home;
pub mod seller;
pub mod sellers;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the buyer routes router.
pub fn buyer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(buyer::dashboard))
        .route("/products", get(buyer::product_grid))
}

/// Create the seller routes router.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(seller::dashboard))
        .route("/products", post(seller::create))
        .route("/products/{id}", post(seller::update))
        .route("/products/{id}/delete", post(seller::delete))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the marketplace.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Role router
        .route("/", get(home::home))
        .route("/dashboard", get(home::dashboard))
        // Buyer routes
        .nest("/buyer", buyer_routes())
        // Seller routes
        .nest("/seller", seller_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Nearby sellers fragment
        .route("/sellers/nearby", get(sellers::nearby))
        // Auth routes
        .nest("/auth", auth_routes())
}
