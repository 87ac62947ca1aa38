//! Admin login against the single configured secret.
//!
//! There are no user accounts: whoever knows `ADMIN_PASSWORD` is the admin.
//! The secret is compared as-is and is not hashed anywhere.

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::LoginRequest;
use crate::sessions::{Session, SessionStore};

pub const INVALID_PASSWORD: &str = "Invalid password";
pub const SESSION_EXPIRED: &str = "Session expired";

/// Exact, case-sensitive comparison. Always false when no secret is
/// configured or no password was supplied.
pub fn verify_admin_password(configured: Option<&str>, candidate: Option<&str>) -> bool {
    match (configured, candidate) {
        (Some(expected), Some(given)) => expected == given,
        _ => false,
    }
}

/// Processes a login attempt for the caller's session.
///
/// # Arguments
/// * `store` - Session store holding the caller's session
/// * `config` - Provides the configured admin secret
/// * `session` - The caller's current session
/// * `login` - Submitted credentials
///
/// # Returns
/// * `Ok(())` - Password matched; the session is now an admin session
/// * `Err(ApiError::Unauthorized)` - Wrong or missing password. The session's
///   admin flag is left exactly as it was.
pub fn process_login(
    store: &SessionStore,
    config: &AppConfig,
    session: &Session,
    login: &LoginRequest,
) -> Result<(), ApiError> {
    if !verify_admin_password(config.admin_password.as_deref(), login.password.as_deref()) {
        warn!("Failed admin login attempt for session {}", session.id);
        return Err(ApiError::Unauthorized(INVALID_PASSWORD));
    }

    if !store.set_admin(&session.id, true) {
        warn!("Session {} expired during login", session.id);
        return Err(ApiError::Unauthorized(SESSION_EXPIRED));
    }

    info!("Admin login for session {}", session.id);
    Ok(())
}
