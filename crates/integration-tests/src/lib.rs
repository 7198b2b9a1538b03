//! Integration tests for the MYBN directory client.
//!
//! # Running Tests
//!
//! ```bash
//! # Scenario tests against the in-process stub service
//! cargo test -p mybn-integration-tests
//!
//! # Live tests against a real catalog service
//! MYBN_API_BASE_URL=https://mybn.in/api/v1/ cargo test -p mybn-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `otp_sign_in` - OTP sign-in, persistence across restarts, sign-out
//! - `catalog_listing` - Paging, filtering, detail lookups and error mapping
//! - `live_api` - Read-only checks against a real deployment (ignored)
//!
//! [`StubServer`] serves a small fixed catalog with the same JSON shapes as
//! the real service, so `HttpApi` is exercised end to end over HTTP.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use mybn_directory::ApiConfig;

/// Mobile number the stub accepts.
pub const TEST_MOBILE: &str = "9876543210";

/// Code the stub accepts for any mobile number.
pub const TEST_CODE: &str = "123456";

/// Token the stub issues on successful verification.
pub const TEST_TOKEN: &str = "tok-stub-41";

/// Token the stub rejects with 401.
pub const EXPIRED_TOKEN: &str = "tok-expired";

/// Request counters and the last `Authorization` header seen.
#[derive(Debug, Default)]
pub struct Hits {
    pub list: AtomicUsize,
    pub detail: AtomicUsize,
    pub categories: AtomicUsize,
    pub send_otp: AtomicUsize,
    pub verify_otp: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

impl Hits {
    /// Number of requests recorded by `counter`.
    #[must_use]
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// `Authorization` header of the most recent catalog request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        self.last_authorization
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, counter: &AtomicUsize, headers: &HeaderMap) -> Option<String> {
        counter.fetch_add(1, Ordering::SeqCst);
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *self
            .last_authorization
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = auth.clone();
        auth
    }
}

struct StubState {
    businesses: Vec<Value>,
    hits: Hits,
}

/// In-process catalog service.
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    task: JoinHandle<()>,
}

impl StubServer {
    /// Start the stub on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let state = Arc::new(StubState {
            businesses: fixtures::businesses(),
            hits: Hits::default(),
        });

        let api = Router::new()
            .route("/businesses", get(list_businesses))
            .route("/business/{id}", get(business_detail))
            .route("/categories", get(categories))
            .route("/featured-businesses", get(featured))
            .route("/send-otp", post(send_otp))
            .route("/verify-otp", post(verify_otp))
            .with_state(state.clone());
        let app = Router::new().nest("/api/v1", api);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Stub server has no address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    /// Base URL of the stub's API, ending in `/`.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid host.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/v1/", self.addr)).expect("Stub URL is valid")
    }

    /// Client settings pointing at the stub.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.base_url())
    }

    /// Requests recorded so far.
    #[must_use]
    pub fn hits(&self) -> &Hits {
        &self.state.hits
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<usize>,
    per_page: Option<usize>,
    search: Option<String>,
    category: Option<String>,
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthenticated." })),
    )
        .into_response()
}

fn is_expired(auth: Option<&str>) -> bool {
    auth.and_then(|h| h.strip_prefix("Bearer ")) == Some(EXPIRED_TOKEN)
}

fn matches_filter(business: &Value, params: &ListParams) -> bool {
    let name = business
        .get("business_name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();
    let category = business
        .pointer("/category/name")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let search_ok = params
        .search
        .as_deref()
        .is_none_or(|q| name.contains(&q.to_lowercase()));
    let category_ok = params.category.as_deref().is_none_or(|c| c == category);
    search_ok && category_ok
}

async fn list_businesses(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    let auth = state.hits.record(&state.hits.list, &headers);
    if is_expired(auth.as_deref()) {
        return unauthorized();
    }

    let matching: Vec<&Value> = state
        .businesses
        .iter()
        .filter(|b| matches_filter(b, &params))
        .collect();
    let per_page = params.per_page.unwrap_or(10).max(1);
    let page = params.page.unwrap_or(1).max(1);
    let last_page = matching.len().div_ceil(per_page).max(1);
    let data: Vec<Value> = matching
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .map(|b| (*b).clone())
        .collect();

    Json(json!({
        "data": data,
        "pagination": {
            "total": matching.len(),
            "per_page": per_page,
            "current_page": page,
            "last_page": last_page,
        }
    }))
    .into_response()
}

async fn business_detail(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let auth = state.hits.record(&state.hits.detail, &headers);
    if is_expired(auth.as_deref()) {
        return unauthorized();
    }

    state
        .businesses
        .iter()
        .find(|b| b.get("id").and_then(Value::as_i64) == Some(id))
        .map_or_else(
            || {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "message": "Business not found" })),
                )
                    .into_response()
            },
            |b| Json(json!({ "data": b })).into_response(),
        )
}

async fn categories(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    state.hits.record(&state.hits.categories, &headers);
    Json(json!({ "data": fixtures::categories() })).into_response()
}

async fn featured(State(state): State<Arc<StubState>>) -> Response {
    let featured: Vec<&Value> = state
        .businesses
        .iter()
        .filter(|b| b.get("featured_banner").is_some_and(|v| !v.is_null()))
        .collect();
    Json(json!({ "data": featured })).into_response()
}

async fn send_otp(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.hits.send_otp.fetch_add(1, Ordering::SeqCst);
    let mobile = body.get("mobile").and_then(Value::as_str).unwrap_or_default();
    if mobile == TEST_MOBILE {
        Json(json!({ "success": true, "message": "OTP sent" })).into_response()
    } else {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "success": false, "message": "Mobile number is not registered" })),
        )
            .into_response()
    }
}

async fn verify_otp(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.hits.verify_otp.fetch_add(1, Ordering::SeqCst);
    if body.get("otp").and_then(Value::as_str) == Some(TEST_CODE) {
        Json(json!({
            "success": true,
            "user": { "id": 41, "name": "Asha Rao", "email": "asha@example.com" },
            "token": TEST_TOKEN,
        }))
        .into_response()
    } else {
        Json(json!({ "success": false, "message": "Invalid OTP" })).into_response()
    }
}

/// Catalog fixtures served by [`StubServer`].
pub mod fixtures {
    use serde_json::{Value, json};

    /// Number of businesses in the fixture catalog.
    pub const BUSINESS_COUNT: usize = 5;

    /// Categories, in display order.
    #[must_use]
    pub fn categories() -> Vec<Value> {
        vec![
            json!({ "id": 1, "name": "Food", "slug": "food" }),
            json!({ "id": 2, "name": "Health", "slug": "health" }),
            json!({ "id": 3, "name": "Fitness", "slug": "fitness" }),
        ]
    }

    /// The fixture catalog, in server order.
    #[must_use]
    pub fn businesses() -> Vec<Value> {
        vec![
            json!({
                "id": 101,
                "business_name": "Anand Sweets",
                "slug": "anand-sweets",
                "category": { "id": 1, "name": "Food", "slug": "food" },
                "city": "Bengaluru",
                "phone": 8_041_112_222_i64,
                "description": "Mysore pak &amp; more since 1988&hellip;",
                "stats": { "rating": "4.6", "total_views": "1520", "products_count": 42 },
                "featured_banner": { "id": 7, "title": "Diwali", "image": "https://cdn.example/b7.jpg" },
                "location": { "city_name": "Bengaluru", "state_name": "Karnataka",
                              "latitude": "12.9716", "longitude": 77.5946 },
            }),
            json!({
                "id": 102,
                "business_name": "Bharat Tyres",
                "category": { "id": 4, "name": "Automotive", "slug": "automotive" },
                "city": "Pune",
                "phone": "",
            }),
            json!({
                "id": 103,
                "business_name": "City Clinic",
                "category": { "id": 2, "name": "Health", "slug": "health" },
                "city": "Mumbai",
            }),
            json!({
                "id": 104,
                "business_name": "Deccan Bakery",
                "category": { "id": 1, "name": "Food", "slug": "food" },
                "city": "Hyderabad",
            }),
            json!({
                "id": 105,
                "business_name": "Eastside Gym",
                "category": { "id": 3, "name": "Fitness", "slug": "fitness" },
                "city": "Kolkata",
                "featured_banner": null,
            }),
        ]
    }
}
