//! Wire types for the catalog service's JSON endpoints.

use serde::{Deserialize, Serialize};

use mybn_core::lenient;
use mybn_core::{Business, ListingPage};

/// Envelope for `GET /businesses`.
#[derive(Debug, Deserialize)]
pub(super) struct BusinessListResponse {
    #[serde(default)]
    pub data: Vec<Business>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination block of a list response.
#[derive(Debug, Default, Deserialize)]
pub(super) struct Pagination {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub last_page: Option<u32>,
}

impl BusinessListResponse {
    /// Convert into a [`ListingPage`] for the requested page.
    ///
    /// A response without pagination data is treated as a single page.
    pub fn into_page(self, page: u32, limit: u32) -> ListingPage {
        let pagination = self.pagination.unwrap_or_default();
        let total = pagination
            .total
            .unwrap_or_else(|| u64::try_from(self.data.len()).unwrap_or(u64::MAX));
        let total_pages = pagination.last_page.unwrap_or(page);

        ListingPage {
            items: self.data,
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// Envelope for single-object and plain-list endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct DataResponse<T> {
    pub data: Option<T>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /send-otp`.
#[derive(Debug, Serialize)]
pub(super) struct SendOtpRequest<'a> {
    pub mobile: &'a str,
}

/// Body of `POST /verify-otp`.
#[derive(Debug, Serialize)]
pub(super) struct VerifyOtpRequest<'a> {
    pub mobile: &'a str,
    pub otp: &'a str,
}

/// Response of `POST /send-otp`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendOtpResponse {
    /// Whether an OTP was issued.
    #[serde(default)]
    pub success: bool,
    /// Server message, shown inline on failure.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `POST /verify-otp`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpResponse {
    /// Whether the code was accepted.
    #[serde(default)]
    pub success: bool,
    /// Account the code belongs to.
    #[serde(default)]
    pub user: Option<OtpUser>,
    /// Bearer token for authenticated requests.
    #[serde(default)]
    pub token: Option<String>,
    /// Server message, shown inline on failure.
    #[serde(default)]
    pub message: Option<String>,
}

/// User record returned by OTP verification.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpUser {
    /// Account ID (string or number on the wire).
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Profile photo URL.
    #[serde(default, alias = "profile_photo")]
    pub photo: Option<String>,
}
