//! Nearby sellers fragment.
//!
//! The buyer dashboard asks the browser for a geolocation fix and then
//! fetches this fragment with `?lat=&lon=`. With a fix, sellers within
//! 2 km are listed closest first; without one, every seller is listed
//! unfiltered so the panel still shows something useful.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use nani_connect_core::Coordinates;

use crate::db::users::UserRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::auth::RequireBuyer;
use crate::models::user::SellerProfile;
use crate::state::AppState;

/// Buyer position query parameters.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Seller display data for templates.
pub struct SellerView {
    pub label: String,
    pub distance_km: Option<f64>,
}

impl SellerView {
    fn new(seller: &SellerProfile, distance_km: Option<f64>) -> Self {
        let label = seller.email.as_ref().map_or_else(
            || format!("Seller #{}", seller.id),
            |email| email.to_string(),
        );
        Self { label, distance_km }
    }
}

/// Nearby sellers fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/nearby_sellers.html")]
pub struct NearbySellersTemplate {
    pub sellers: Vec<SellerView>,
    /// Whether a geolocation fix was supplied (switches the heading and
    /// the empty-state copy).
    pub located: bool,
}

/// List sellers near the buyer's position.
#[instrument(skip(state, _user))]
pub async fn nearby(
    RequireBuyer(_user): RequireBuyer,
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<impl IntoResponse> {
    let sellers = UserRepository::new(state.pool()).list_sellers().await?;

    // A position needs both halves of the fix
    let buyer = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        _ => None,
    };

    let views = match buyer {
        Some(position) => rank_nearby(&sellers, position)
            .into_iter()
            .map(|(distance, seller)| SellerView::new(seller, Some(distance)))
            .collect(),
        None => sellers
            .iter()
            .map(|seller| SellerView::new(seller, None))
            .collect(),
    };

    Ok(NearbySellersTemplate {
        sellers: views,
        located: buyer.is_some(),
    })
}

/// Sellers within the nearby radius of the buyer, closest first.
///
/// Coordinate-less sellers cannot be ranked and drop out of the filtered
/// view; they still show up in the unfiltered fallback.
fn rank_nearby(
    sellers: &[SellerProfile],
    buyer: Coordinates,
) -> Vec<(f64, &SellerProfile)> {
    let mut nearby: Vec<(f64, &SellerProfile)> = sellers
        .iter()
        .filter_map(|seller| {
            seller
                .distance_from_km(buyer)
                .filter(|d| *d <= nani_connect_core::NEARBY_RADIUS_KM)
                .map(|d| (d, seller))
        })
        .collect();
    nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
    nearby
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use nani_connect_core::UserId;

    use super::*;

    fn seller(id: i32, coordinates: Option<Coordinates>) -> SellerProfile {
        SellerProfile {
            id: UserId::new(id),
            email: None,
            coordinates,
        }
    }

    // Central Chennai
    const BUYER: Coordinates = Coordinates::new(13.0827, 80.2707);

    #[test]
    fn test_rank_nearby_filters_and_sorts() {
        let sellers = vec![
            // ~1.09 km away
            seller(1, Some(Coordinates::new(13.0900, 80.2800))),
            // ~290 km away (Bangalore)
            seller(2, Some(Coordinates::new(12.9716, 77.5946))),
            // right on top of the buyer
            seller(3, Some(BUYER)),
            // never shared a location
            seller(4, None),
        ];

        let ranked = rank_nearby(&sellers, BUYER);
        let ids: Vec<i32> = ranked.iter().map(|(_, s)| s.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(ranked[0].0 < ranked[1].0);
        assert!((ranked[1].0 - 1.09).abs() < 0.05);
    }

    #[test]
    fn test_rank_nearby_empty_without_candidates() {
        let sellers = vec![seller(1, None)];
        assert!(rank_nearby(&sellers, BUYER).is_empty());
    }
}
