//! Stored session commands.

use mybn_directory::SessionState;

use super::Context;

/// Report who is signed in.
pub async fn status(ctx: &Context) {
    match ctx.session.resolve_session().await {
        SessionState::Authenticated(user) => {
            tracing::info!(
                "Signed in as {} via {} ({})",
                user.display_name(),
                user.auth_type,
                user.id
            );
        }
        _ => tracing::info!("Not signed in"),
    }
}

/// Delete the stored session.
pub async fn logout(ctx: &Context) {
    let report = ctx.session.sign_out().await;
    if report.is_clean() {
        tracing::info!("Signed out");
    } else {
        for (key, error) in &report.failures {
            tracing::warn!(key, error = %error, "Could not delete session entry");
        }
        tracing::info!("Signed out, but some session data could not be deleted");
    }
}
