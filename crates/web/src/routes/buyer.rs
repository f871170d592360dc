//! Buyer dashboard route handlers.
//!
//! The dashboard renders the full product catalog with a text search box
//! (typed or dictated) and panels for the cart and nearby sellers, both
//! loaded as HTMX fragments.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::auth::RequireBuyer;
use crate::models::product::Product;
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    /// Plain decimal amount for form prefills.
    pub price_input: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            price_input: product.price.amount().to_string(),
            image_url: product.image_url.clone(),
        }
    }
}

/// Buyer dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "buyer/dashboard.html")]
pub struct BuyerDashboardTemplate {
    pub email: String,
    pub q: String,
    pub products: Vec<ProductView>,
}

/// Product grid fragment template (for HTMX live search).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub products: Vec<ProductView>,
}

/// Display the buyer dashboard.
#[instrument(skip(state, user))]
pub async fn dashboard(
    RequireBuyer(user): RequireBuyer,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let products = load_products(&state, query.q.as_deref()).await?;

    Ok(BuyerDashboardTemplate {
        email: user.email.to_string(),
        q: query.q.unwrap_or_default(),
        products,
    })
}

/// Product grid fragment, re-rendered on every search keystroke and on
/// voice search results.
#[instrument(skip(state, _user))]
pub async fn product_grid(
    RequireBuyer(_user): RequireBuyer,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let products = load_products(&state, query.q.as_deref()).await?;
    Ok(ProductGridTemplate { products })
}

async fn load_products(state: &AppState, filter: Option<&str>) -> Result<Vec<ProductView>> {
    let products = ProductRepository::new(state.pool()).list_all(filter).await?;
    Ok(products.iter().map(ProductView::from).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_button_stays_active_while_listening() {
        let html = BuyerDashboardTemplate {
            email: "buyer@example.com".to_owned(),
            q: String::new(),
            products: Vec::new(),
        }
        .render()
        .unwrap();

        // A second tap on the mic must stop an in-flight recognition
        // instead of leaving the user to wait out the recognizer.
        assert!(html.contains("active.stop()"));
        assert!(html.contains("active = recognition;"));
        assert!(!html.contains("button.disabled = true;\n\n      recognition"));
    }
}
