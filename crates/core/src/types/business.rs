//! Catalog records.
//!
//! Businesses are owned by the catalog service and read-only on the client.
//! Most fields are optional because the service omits or nulls them freely.

use serde::{Deserialize, Serialize};

use super::id::{BannerId, BusinessId, CategoryId};
use super::lenient;
use crate::text::decode_html_entities;

/// A listed business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    /// Catalog ID. Accepted as a number or a numeric string.
    #[serde(deserialize_with = "lenient::id")]
    pub id: BusinessId,
    /// Public business name. Empty when the service sends `null`.
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub business_name: String,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Category the business is listed under.
    #[serde(default)]
    pub category: Option<BusinessCategory>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// City name.
    #[serde(default)]
    pub city: Option<String>,
    /// Contact phone.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Website URL.
    #[serde(default)]
    pub website: Option<String>,
    /// Description, may contain HTML entities.
    #[serde(default)]
    pub description: Option<String>,
    /// Person managing the listing.
    #[serde(default)]
    pub managed_by: Option<String>,
    /// Listing statistics.
    #[serde(default)]
    pub stats: BusinessStats,
    /// Banner shown on cards and the detail header.
    #[serde(default)]
    pub featured_banner: Option<Banner>,
    /// Geographic location.
    #[serde(default)]
    pub location: Option<Location>,
}

impl Business {
    /// Description with HTML entities decoded, empty if absent.
    #[must_use]
    pub fn plain_description(&self) -> String {
        self.description
            .as_deref()
            .map(decode_html_entities)
            .unwrap_or_default()
    }

    /// Category name, if the business is categorised.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    /// Featured banner image URL.
    #[must_use]
    pub fn banner_image(&self) -> Option<&str> {
        self.featured_banner
            .as_ref()
            .and_then(|b| b.image.as_deref())
    }
}

/// Category reference embedded in a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCategory {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
}

/// A category from the category list endpoint.
pub type Category = BusinessCategory;

/// Listing statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessStats {
    /// Average rating (0-5).
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub rating: Option<f64>,
    /// Total profile views.
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub total_views: u64,
    /// Number of listed products.
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub products_count: u64,
}

/// Banner image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    /// Banner ID.
    #[serde(default)]
    pub id: Option<BannerId>,
    /// Banner title.
    #[serde(default)]
    pub title: Option<String>,
    /// Image URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Geographic location of a business.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// City name.
    #[serde(default)]
    pub city_name: Option<String>,
    /// State name.
    #[serde(default)]
    pub state_name: Option<String>,
    /// Latitude in degrees.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub longitude: Option<f64>,
}

impl Location {
    /// Coordinates as `(latitude, longitude)` when both are known.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}
