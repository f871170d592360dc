//! User domain types.
//!
//! These types represent validated domain objects read from the database.

use chrono::{DateTime, Utc};

use nani_connect_core::{Coordinates, Email, Role, UserId};

/// A marketplace user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Buyer or seller; set once at sign-up.
    pub role: Role,
    /// Seller location, if the user opted into sharing it at sign-up.
    pub coordinates: Option<Coordinates>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A seller as shown to buyers in the nearby-sellers panel.
#[derive(Debug, Clone)]
pub struct SellerProfile {
    /// The seller's user ID.
    pub id: UserId,
    /// Contact email, when available.
    pub email: Option<Email>,
    /// Stored location; absent when the seller declined sharing.
    pub coordinates: Option<Coordinates>,
}

impl SellerProfile {
    /// Distance from a buyer's fix, when this seller has a stored location.
    #[must_use]
    pub fn distance_from_km(&self, buyer: Coordinates) -> Option<f64> {
        self.coordinates.map(|c| buyer.distance_km(&c))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_requires_coordinates() {
        let seller = SellerProfile {
            id: UserId::new(1),
            email: None,
            coordinates: None,
        };
        assert!(
            seller
                .distance_from_km(Coordinates::new(13.0827, 80.2707))
                .is_none()
        );
    }

    #[test]
    fn test_distance_from_buyer() {
        let seller = SellerProfile {
            id: UserId::new(2),
            email: Some(Email::parse("seller@example.com").unwrap()),
            coordinates: Some(Coordinates::new(13.0900, 80.2800)),
        };
        let d = seller
            .distance_from_km(Coordinates::new(13.0827, 80.2707))
            .unwrap();
        assert!((d - 1.09).abs() < 0.05);
    }
}
