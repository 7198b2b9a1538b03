//! Catalog service client.
//!
//! # Architecture
//!
//! - JSON over HTTPS with `reqwest`, one shared client per [`HttpApi`]
//! - A single global timeout applied to every request
//! - Credentials passed explicitly per call, never stored as default headers
//! - Business details and the category list cached via `moka`
//!
//! # Endpoints
//!
//! - `GET businesses?page=&per_page=` - paginated catalog
//! - `GET businesses?search=&category=` - filtered search
//! - `GET business/{id}` - business detail
//! - `GET categories`, `GET featured-businesses`
//! - `POST send-otp`, `POST verify-otp` - SMS sign-in
//!
//! The [`CatalogApi`] and [`AuthApi`] traits are the seams the session
//! manager and listing controller depend on.

mod cache;
mod credentials;
mod types;

pub use credentials::{Credentials, SharedCredentials};
pub use types::{OtpUser, SendOtpResponse, VerifyOtpResponse};

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use mybn_core::{Business, BusinessId, Category, FilterState, ListingPage, MobileNumber, OtpCode};

use crate::config::ApiConfig;
use cache::{CacheKey, CacheValue};
use types::{BusinessListResponse, DataResponse, ErrorBody, SendOtpRequest, VerifyOtpRequest};

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    /// Paginated business list and search.
    pub const BUSINESSES: &str = "businesses";
    /// Business detail prefix; the ID is appended.
    pub const BUSINESS_DETAIL: &str = "business/";
    /// Category list.
    pub const CATEGORIES: &str = "categories";
    /// Featured businesses.
    pub const FEATURED_BUSINESSES: &str = "featured-businesses";
    /// Issue an OTP.
    pub const SEND_OTP: &str = "send-otp";
    /// Verify an OTP.
    pub const VERIFY_OTP: &str = "verify-otp";
}

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Service rejected the bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The bearer token cannot be sent as a header.
    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl ApiError {
    /// Whether retrying the same request later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited(_) | Self::Parse(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Unauthorized | Self::NotFound(_) | Self::Url(_) | Self::InvalidCredentials => {
                false
            }
        }
    }

    /// Message suitable for inline display next to a form.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            Self::Http(e) if e.is_timeout() => "The request timed out".to_string(),
            Self::Http(_) => "Could not reach the server".to_string(),
            Self::RateLimited(secs) => format!("Too many attempts, try again in {secs} seconds"),
            Self::Unauthorized => "Your session has expired, please sign in again".to_string(),
            Self::NotFound(_) => "Not found".to_string(),
            _ => "Something went wrong".to_string(),
        }
    }
}

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Read access to the business catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of the catalog.
    async fn list_businesses(
        &self,
        credentials: &Credentials,
        page: u32,
        per_page: u32,
    ) -> Result<ListingPage, ApiError>;

    /// Fetch a single business. Missing records yield [`ApiError::NotFound`].
    async fn get_business(
        &self,
        credentials: &Credentials,
        id: BusinessId,
    ) -> Result<Business, ApiError>;

    /// Search the whole catalog by query and category.
    async fn search_businesses(
        &self,
        credentials: &Credentials,
        filter: &FilterState,
        limit: u32,
    ) -> Result<Vec<Business>, ApiError>;

    /// List all categories.
    async fn list_categories(&self, credentials: &Credentials) -> Result<Vec<Category>, ApiError>;

    /// List featured businesses.
    async fn featured_businesses(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Business>, ApiError>;
}

/// SMS one-time-password endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Ask the service to send an OTP to `mobile`.
    async fn send_otp(&self, mobile: &MobileNumber) -> Result<SendOtpResponse, ApiError>;

    /// Verify an OTP previously sent to `mobile`.
    async fn verify_otp(
        &self,
        mobile: &MobileNumber,
        code: &OtpCode,
    ) -> Result<VerifyOtpResponse, ApiError>;
}

// =============================================================================
// HttpApi
// =============================================================================

/// HTTP client for the catalog service.
#[derive(Clone)]
pub struct HttpApi {
    inner: Arc<HttpApiInner>,
}

struct HttpApiInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl HttpApi {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpApiInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop all cached catalog responses.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Build a request for `path`, attaching credentials when present.
    fn request(
        &self,
        method: Method,
        path: &str,
        credentials: &Credentials,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let mut request = self.inner.client.request(method, url);
        if let Some(header) = credentials.header_value()? {
            request = request.header(AUTHORIZATION, header);
        }
        Ok(request)
    }

    /// Send a request and decode its JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error_message(&response_text),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            ApiError::Parse(e)
        })
    }
}

/// Extract a human-readable message from an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl CatalogApi for HttpApi {
    #[instrument(skip(self, credentials))]
    async fn list_businesses(
        &self,
        credentials: &Credentials,
        page: u32,
        per_page: u32,
    ) -> Result<ListingPage, ApiError> {
        let request = self
            .request(Method::GET, endpoints::BUSINESSES, credentials)?
            .query(&[("page", page), ("per_page", per_page)]);

        let response: BusinessListResponse = self.execute(request).await?;
        Ok(response.into_page(page, per_page))
    }

    #[instrument(skip(self, credentials), fields(id = %id))]
    async fn get_business(
        &self,
        credentials: &Credentials,
        id: BusinessId,
    ) -> Result<Business, ApiError> {
        let cache_key = CacheKey::Business(id);

        // Check cache
        if let Some(CacheValue::Business(business)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for business");
            return Ok(*business);
        }

        let path = format!("{}{id}", endpoints::BUSINESS_DETAIL);
        let request = self.request(Method::GET, &path, credentials)?;

        let response: DataResponse<Business> = match self.execute(request).await {
            Ok(response) => response,
            Err(ApiError::Api { status: 404, .. }) => {
                return Err(ApiError::NotFound(format!("Business not found: {id}")));
            }
            Err(e) => return Err(e),
        };

        let business = response
            .data
            .ok_or_else(|| ApiError::NotFound(format!("Business not found: {id}")))?;

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::Business(Box::new(business.clone())))
            .await;

        Ok(business)
    }

    #[instrument(skip(self, credentials))]
    async fn search_businesses(
        &self,
        credentials: &Credentials,
        filter: &FilterState,
        limit: u32,
    ) -> Result<Vec<Business>, ApiError> {
        let mut params = vec![("page", "1".to_string()), ("per_page", limit.to_string())];
        if let Some(query) = filter.search_query() {
            params.push(("search", query.to_string()));
        }
        if let Some(category) = filter.category_filter() {
            params.push(("category", category.to_string()));
        }

        let request = self
            .request(Method::GET, endpoints::BUSINESSES, credentials)?
            .query(&params);

        let response: BusinessListResponse = self.execute(request).await?;
        Ok(response.data)
    }

    #[instrument(skip(self, credentials))]
    async fn list_categories(&self, credentials: &Credentials) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let request = self.request(Method::GET, endpoints::CATEGORIES, credentials)?;
        let response: DataResponse<Vec<Category>> = self.execute(request).await?;
        let categories = response.data.unwrap_or_default();

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    #[instrument(skip(self, credentials))]
    async fn featured_businesses(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Business>, ApiError> {
        let request = self.request(Method::GET, endpoints::FEATURED_BUSINESSES, credentials)?;
        let response: DataResponse<Vec<Business>> = self.execute(request).await?;
        Ok(response.data.unwrap_or_default())
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    #[instrument(skip(self), fields(mobile = %mobile.masked()))]
    async fn send_otp(&self, mobile: &MobileNumber) -> Result<SendOtpResponse, ApiError> {
        let request = self
            .request(Method::POST, endpoints::SEND_OTP, &Credentials::anonymous())?
            .json(&SendOtpRequest {
                mobile: mobile.as_str(),
            });

        self.execute(request).await
    }

    #[instrument(skip(self, code), fields(mobile = %mobile.masked()))]
    async fn verify_otp(
        &self,
        mobile: &MobileNumber,
        code: &OtpCode,
    ) -> Result<VerifyOtpResponse, ApiError> {
        let request = self
            .request(Method::POST, endpoints::VERIFY_OTP, &Credentials::anonymous())?
            .json(&VerifyOtpRequest {
                mobile: mobile.as_str(),
                otp: code.as_str(),
            });

        self.execute(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api() -> HttpApi {
        HttpApi::new(&ApiConfig::new(Url::parse(crate::config::DEFAULT_BASE_URL).unwrap())).unwrap()
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("Business not found: 9".to_string());
        assert_eq!(err.to_string(), "Not found: Business not found: 9");

        let err = ApiError::Api {
            status: 422,
            message: "Invalid mobile".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 422 - Invalid mobile");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::RateLimited(5).is_retryable());
        assert!(
            ApiError::Api {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            !ApiError::Api {
                status: 400,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(!ApiError::NotFound("x".to_string()).is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
    }

    #[test]
    fn test_display_message_prefers_server_text() {
        let err = ApiError::Api {
            status: 400,
            message: "OTP expired".to_string(),
        };
        assert_eq!(err.display_message(), "OTP expired");
        assert_eq!(
            ApiError::RateLimited(30).display_message(),
            "Too many attempts, try again in 30 seconds"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message": "Invalid OTP"}"#), "Invalid OTP");
        assert_eq!(error_message(r#"{"error": "Bad mobile"}"#), "Bad mobile");
        assert_eq!(error_message("Gateway Timeout"), "Gateway Timeout");
    }

    #[test]
    fn test_request_urls() {
        let api = api();
        let request = api
            .request(Method::GET, endpoints::BUSINESSES, &Credentials::anonymous())
            .unwrap()
            .query(&[("page", 2), ("per_page", 6)])
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://mybn.in/api/v1/businesses?page=2&per_page=6"
        );
        assert!(request.headers().get(AUTHORIZATION).is_none());

        let detail = api
            .request(Method::GET, "business/12", &Credentials::anonymous())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(detail.url().as_str(), "https://mybn.in/api/v1/business/12");
    }

    #[test]
    fn test_request_carries_explicit_credentials() {
        let api = api();
        let request = api
            .request(Method::GET, endpoints::CATEGORIES, &Credentials::bearer("tok-abc"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer tok-abc"
        );

        // Credentials are not retained by the client
        let next = api
            .request(Method::GET, endpoints::CATEGORIES, &Credentials::anonymous())
            .unwrap()
            .build()
            .unwrap();
        assert!(next.headers().get(AUTHORIZATION).is_none());
    }
}
