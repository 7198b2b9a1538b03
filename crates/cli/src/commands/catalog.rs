//! Catalog browsing commands.
//!
//! Each command resolves the stored session first so requests carry the
//! signed-in user's token when there is one.

use std::sync::Arc;

use mybn_core::{ALL_CATEGORIES, Business, BusinessId, FilterState, Location};
use mybn_directory::{CatalogApi, Credentials, FilterOutcome, ListingController, LoadOutcome};

use super::Context;

async fn credentials(ctx: &Context) -> Credentials {
    ctx.session.resolve_session().await;
    ctx.session.credentials()
}

fn log_business(business: &Business) {
    tracing::info!(
        "#{} {} | {} | {}",
        business.id,
        business.business_name,
        business.category_name().unwrap_or("-"),
        business.city.as_deref().unwrap_or("-"),
    );
}

/// List businesses page by page, or search when a filter is given.
///
/// # Errors
///
/// Returns an error if a request fails.
pub async fn businesses(
    ctx: &Context,
    page: u32,
    pages: u32,
    query: Option<String>,
    category: Option<String>,
) -> mybn_directory::Result<()> {
    ctx.session.resolve_session().await;
    let listing = ListingController::with_credentials(
        Arc::new(ctx.api.clone()),
        ctx.config.listing,
        ctx.session.shared_credentials(),
    );

    let filter = FilterState::new(
        query.unwrap_or_default(),
        category.unwrap_or_else(|| ALL_CATEGORIES.to_string()),
    );

    if filter.is_unfiltered() {
        listing.load_page(page.max(1), true).await?;
        for _ in 1..pages {
            if listing.load_more().await? == LoadOutcome::Exhausted {
                break;
            }
        }
    } else if let FilterOutcome::Searched(0) = listing.apply_filter(filter).await? {
        tracing::info!("No businesses match this filter");
        return Ok(());
    }

    let snapshot = listing.snapshot();
    for business in &snapshot.visible {
        log_business(business);
    }

    if snapshot.is_filtered() {
        tracing::info!("{} matching businesses", snapshot.visible.len());
    } else {
        tracing::info!(
            "Showing {} of {} businesses (page {}{})",
            snapshot.visible.len(),
            snapshot.total,
            snapshot.page,
            if snapshot.has_more { ", more available" } else { "" }
        );
    }
    Ok(())
}

/// Show one business in full.
///
/// # Errors
///
/// Returns an error if the business does not exist or the request fails.
pub async fn business(ctx: &Context, id: i64) -> mybn_directory::Result<()> {
    let business = ctx
        .api
        .get_business(&credentials(ctx).await, BusinessId::new(id))
        .await?;

    tracing::info!("{}", business.business_name);
    if let Some(category) = business.category_name() {
        tracing::info!("Category: {category}");
    }
    if let Some(address) = &business.address {
        tracing::info!("Address:  {address}");
    }
    if let Some(phone) = &business.phone {
        tracing::info!("Phone:    {phone}");
    }
    if let Some(email) = &business.email {
        tracing::info!("Email:    {email}");
    }
    if let Some(website) = &business.website {
        tracing::info!("Website:  {website}");
    }
    if let Some(rating) = business.stats.rating {
        tracing::info!("Rating:   {rating:.1} ({} views)", business.stats.total_views);
    }
    if let Some((lat, lng)) = business.location.as_ref().and_then(Location::coordinates) {
        tracing::info!("Location: {lat:.5}, {lng:.5}");
    }

    let description = business.plain_description();
    if !description.is_empty() {
        tracing::info!("{description}");
    }
    Ok(())
}

/// List all categories.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn categories(ctx: &Context) -> mybn_directory::Result<()> {
    let categories = ctx.api.list_categories(&credentials(ctx).await).await?;
    for category in &categories {
        tracing::info!("#{} {}", category.id, category.name);
    }
    tracing::info!("{} categories", categories.len());
    Ok(())
}

/// List featured businesses.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn featured(ctx: &Context) -> mybn_directory::Result<()> {
    let featured = ctx.api.featured_businesses(&credentials(ctx).await).await?;
    for business in &featured {
        log_business(business);
    }
    tracing::info!("{} featured businesses", featured.len());
    Ok(())
}
