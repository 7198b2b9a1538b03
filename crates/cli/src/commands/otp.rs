//! OTP sign-in commands.
//!
//! # Usage
//!
//! ```bash
//! mybn otp send 9876543210
//! mybn otp verify 9876543210 123456
//! ```

use super::Context;

/// Ask the service to text a code to `mobile`.
///
/// # Errors
///
/// Returns an error if the number is invalid or the request fails.
pub async fn send(ctx: &Context, mobile: &str) -> mybn_directory::Result<()> {
    if ctx.session.send_otp(mobile).await? {
        tracing::info!("Code sent. Run `mybn otp verify {mobile} <code>` to sign in.");
    } else {
        tracing::warn!("The service did not send a code, try again shortly");
    }
    Ok(())
}

/// Verify a code and store the resulting session.
///
/// # Errors
///
/// Returns an error if the number or code is malformed or the request fails.
pub async fn verify(ctx: &Context, mobile: &str, code: &str) -> mybn_directory::Result<()> {
    match ctx.session.verify_otp(mobile, code).await? {
        Some(user) => {
            tracing::info!("Signed in as {} ({})", user.display_name(), user.id);
        }
        None => tracing::warn!("Code was not accepted"),
    }
    Ok(())
}
