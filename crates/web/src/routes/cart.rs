//! Cart route handlers.
//!
//! The cart is session-scoped: a list of product snapshots that lives
//! exactly as long as the session. Operations use HTMX for dynamic
//! updates without full page reloads.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use nani_connect_core::{Price, ProductId};

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireBuyer;
use crate::models::session_keys;
use crate::state::AppState;

/// A product snapshot stored in the session cart.
///
/// The name and price are captured at add time; a seller editing the
/// product later does not rewrite carts that already hold it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
}

/// Cart display data for templates.
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
}

/// Cart line display data for templates.
pub struct CartItemView {
    pub index: usize,
    pub name: String,
    pub price: String,
}

impl CartView {
    fn from_items(items: &[CartItem]) -> Self {
        Self {
            items: items
                .iter()
                .enumerate()
                .map(|(index, item)| CartItemView {
                    index,
                    name: item.name.clone(),
                    price: item.price.display(),
                })
                .collect(),
            total: Price::total(items.iter().map(|i| i.price)).display(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session, defaulting to empty.
async fn load_cart(session: &Session) -> Vec<CartItem> {
    session
        .get::<Vec<CartItem>>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persist the cart back into the session.
async fn save_cart(session: &Session, items: &[CartItem]) -> Result<()> {
    session
        .insert(session_keys::CART, items)
        .await
        .map_err(|e| AppError::Internal(format!("failed to save cart: {e}")))
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub index: usize,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// Render the cart items fragment.
#[instrument(skip(session, _user))]
pub async fn show(RequireBuyer(_user): RequireBuyer, session: Session) -> impl IntoResponse {
    let items = load_cart(&session).await;
    CartItemsTemplate {
        cart: CartView::from_items(&items),
    }
}

/// Add a product snapshot to the cart (HTMX).
///
/// Returns the refreshed count badge and triggers `cart-updated` so the
/// cart panel re-fetches itself.
#[instrument(skip(state, session, _user))]
pub async fn add(
    RequireBuyer(_user): RequireBuyer,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(ProductId::new(form.product_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let mut items = load_cart(&session).await;
    items.push(CartItem {
        product_id: product.id,
        name: product.name,
        price: product.price,
    });
    save_cart(&session, &items).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count: items.len() },
    )
        .into_response())
}

/// Remove a cart line by position (HTMX).
#[instrument(skip(session, _user))]
pub async fn remove(
    RequireBuyer(_user): RequireBuyer,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut items = load_cart(&session).await;
    if form.index < items.len() {
        items.remove(form.index);
        save_cart(&session, &items).await?;
    }

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_items(&items),
        },
    )
        .into_response())
}

/// Render the cart count badge (HTMX).
#[instrument(skip(session, _user))]
pub async fn count(RequireBuyer(_user): RequireBuyer, session: Session) -> impl IntoResponse {
    let items = load_cart(&session).await;
    CartCountTemplate { count: items.len() }
}
