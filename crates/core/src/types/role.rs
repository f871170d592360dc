//! User role classification.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Role of a marketplace user.
///
/// A closed classification set at sign-up and never changed afterwards.
/// The role decides which dashboard the user lands on and whether they
/// may own products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Browses products, holds a cart, searches nearby sellers.
    #[default]
    Buyer,
    /// Lists and manages products, optionally shares a location.
    Seller,
}

impl Role {
    /// The role's canonical string form, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
        }
    }

    /// Parse a stored role value, defaulting unknown values to `Buyer`.
    ///
    /// The routing rule is "seller goes to the seller dashboard, anything
    /// else is a buyer", so an unrecognized value degrades to `Buyer`
    /// instead of failing the whole read. Callers that care can log the
    /// mismatch via the returned flag.
    #[must_use]
    pub fn parse_lossy(s: &str) -> (Self, bool) {
        match s {
            "seller" => (Self::Seller, true),
            "buyer" => (Self::Buyer, true),
            _ => (Self::Buyer, false),
        }
    }

    /// Whether this role may own and mutate products.
    #[must_use]
    pub const fn is_seller(self) -> bool {
        matches!(self, Self::Seller)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Error returned when a role string is not part of the closed set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lossy_known() {
        assert_eq!(Role::parse_lossy("seller"), (Role::Seller, true));
        assert_eq!(Role::parse_lossy("buyer"), (Role::Buyer, true));
    }

    #[test]
    fn test_parse_lossy_unknown_defaults_to_buyer() {
        assert_eq!(Role::parse_lossy("admin"), (Role::Buyer, false));
        assert_eq!(Role::parse_lossy(""), (Role::Buyer, false));
    }

    #[test]
    fn test_from_str_strict() {
        assert_eq!("seller".parse::<Role>().ok(), Some(Role::Seller));
        assert!("vendor".parse::<Role>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        assert_eq!(Role::Seller.to_string(), "seller");
        assert_eq!(Role::Buyer.to_string(), "buyer");
    }
}
