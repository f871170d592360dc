//! Seller dashboard route handlers.
//!
//! Sellers manage their own products only. Every mutation goes through
//! the catalog service, which scopes the SQL to the authenticated seller;
//! a form naming someone else's product ID comes back as not-found.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use nani_connect_core::{Price, ProductId};

use crate::db::products::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::auth::RequireSeller;
use crate::routes::buyer::ProductView;
use crate::services::catalog::{
    CatalogError, CatalogService, ImageAction, ImageUpload, ProductDraft,
};
use crate::services::storage;
use crate::state::AppState;

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Map a redirect error code to the message shown in the flash banner.
fn describe_error(code: &str) -> String {
    match code {
        "missing_fields" => "Name, description, and price are all required.".to_owned(),
        "invalid_price" => "Price must be a non-negative number.".to_owned(),
        "not_found" => "That product no longer exists.".to_owned(),
        _ => "Something went wrong, please try again.".to_owned(),
    }
}

/// Seller dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/dashboard.html")]
pub struct SellerDashboardTemplate {
    pub email: String,
    pub products: Vec<ProductView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the seller dashboard with the seller's own products.
#[instrument(skip(state, user))]
pub async fn dashboard(
    RequireSeller(user): RequireSeller,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool())
        .list_by_seller(user.id)
        .await?;

    Ok(SellerDashboardTemplate {
        email: user.email.to_string(),
        products: products.iter().map(ProductView::from).collect(),
        error: query.error.as_deref().map(describe_error),
        success: query.success,
    })
}

// =============================================================================
// Multipart Form Parsing
// =============================================================================

/// Parsed product form fields from a multipart submission.
struct ProductForm {
    name: String,
    description: String,
    price: String,
    image: Option<ImageUpload>,
    clear_image: bool,
}

/// Outcomes that redirect back to the dashboard with an error code.
#[derive(Debug)]
enum FormRejection {
    MissingFields,
    InvalidPrice,
}

impl FormRejection {
    const fn code(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::InvalidPrice => "invalid_price",
        }
    }
}

/// Pull the product fields out of a multipart body.
///
/// An image part with an empty body means "no file chosen" and is
/// treated as absent.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm> {
    let mut form = ProductForm {
        name: String::new(),
        description: String::new(),
        price: String::new(),
        image: None,
        clear_image: false,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| crate::error::AppError::BadRequest(format!("invalid form data: {e}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = read_text(field).await?,
            "description" => form.description = read_text(field).await?,
            "price" => form.price = read_text(field).await?,
            "clear_image" => form.clear_image = read_text(field).await? == "on",
            "image" => {
                let filename = field.file_name().map(ToOwned::to_owned);
                let content_type = field.content_type().map(ToOwned::to_owned);
                let bytes = field.bytes().await.map_err(|e| {
                    crate::error::AppError::BadRequest(format!("invalid upload: {e}"))
                })?;
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        bytes: bytes.to_vec(),
                        extension: storage::extension_for(
                            filename.as_deref(),
                            content_type.as_deref(),
                        ),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| crate::error::AppError::BadRequest(format!("invalid form field: {e}")))
}

/// Validate the text fields into a draft.
fn validate_draft(form: &ProductForm) -> std::result::Result<ProductDraft, FormRejection> {
    let name = form.name.trim();
    let description = form.description.trim();
    if name.is_empty() || description.is_empty() || form.price.trim().is_empty() {
        return Err(FormRejection::MissingFields);
    }

    let price = Price::parse(&form.price).map_err(|_| FormRejection::InvalidPrice)?;

    Ok(ProductDraft {
        name: name.to_owned(),
        description: description.to_owned(),
        price,
    })
}

// =============================================================================
// Mutations
// =============================================================================

/// Create a product, optionally with an image.
#[instrument(skip(state, user, multipart))]
pub async fn create(
    RequireSeller(user): RequireSeller,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let form = read_product_form(multipart).await?;
    let draft = match validate_draft(&form) {
        Ok(draft) => draft,
        Err(rejection) => {
            return Ok(Redirect::to(&format!("/seller?error={}", rejection.code())).into_response());
        }
    };

    let catalog = CatalogService::new(ProductRepository::new(state.pool()), state.images());
    catalog.create(user.id, draft, form.image).await?;

    Ok(Redirect::to("/seller?success=Product+created").into_response())
}

/// Update a product's fields and image.
#[instrument(skip(state, user, multipart))]
pub async fn update(
    RequireSeller(user): RequireSeller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response> {
    let form = read_product_form(multipart).await?;
    let draft = match validate_draft(&form) {
        Ok(draft) => draft,
        Err(rejection) => {
            return Ok(Redirect::to(&format!("/seller?error={}", rejection.code())).into_response());
        }
    };

    let action = match (form.image, form.clear_image) {
        (Some(image), _) => ImageAction::Replace(image),
        (None, true) => ImageAction::Clear,
        (None, false) => ImageAction::Keep,
    };

    let catalog = CatalogService::new(ProductRepository::new(state.pool()), state.images());
    match catalog
        .update(user.id, ProductId::new(id), draft, action)
        .await
    {
        Ok(_) => Ok(Redirect::to("/seller?success=Product+updated").into_response()),
        Err(CatalogError::NotFound) => {
            Ok(Redirect::to("/seller?error=not_found").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a product and its stored image.
#[instrument(skip(state, user))]
pub async fn delete(
    RequireSeller(user): RequireSeller,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response> {
    let catalog = CatalogService::new(ProductRepository::new(state.pool()), state.images());
    match catalog.delete(user.id, ProductId::new(id)).await {
        Ok(()) => Ok(Redirect::to("/seller?success=Product+deleted").into_response()),
        Err(CatalogError::NotFound) => {
            Ok(Redirect::to("/seller?error=not_found").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, description: &str, price: &str) -> ProductForm {
        ProductForm {
            name: name.to_owned(),
            description: description.to_owned(),
            price: price.to_owned(),
            image: None,
            clear_image: false,
        }
    }

    #[test]
    fn test_validate_draft_trims_and_accepts() {
        let draft = validate_draft(&form("  Mug  ", "Ceramic.", "12.50")).unwrap();
        assert_eq!(draft.name, "Mug");
        assert_eq!(draft.price.display(), "$12.50");
    }

    #[test]
    fn test_validate_draft_rejects_blank_fields() {
        assert!(matches!(
            validate_draft(&form("   ", "desc", "1.00")),
            Err(FormRejection::MissingFields)
        ));
        assert!(matches!(
            validate_draft(&form("Mug", "desc", "")),
            Err(FormRejection::MissingFields)
        ));
    }

    #[test]
    fn test_validate_draft_rejects_bad_price() {
        assert!(matches!(
            validate_draft(&form("Mug", "desc", "free")),
            Err(FormRejection::InvalidPrice)
        ));
        assert!(matches!(
            validate_draft(&form("Mug", "desc", "-5")),
            Err(FormRejection::InvalidPrice)
        ));
    }
}
