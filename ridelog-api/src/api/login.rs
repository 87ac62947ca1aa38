//! API endpoints for admin login and authentication status.

use rocket::form::Form;
use rocket::serde::json::{self, Json};
use rocket::{Route, State};

use crate::auth::login::process_login;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{AuthStatus, AuthSuccess, LoginRequest};
use crate::session_guards::SessionContext;
use crate::sessions::SessionStore;

/// Login endpoint that turns the caller's session into an admin session.
///
/// - **URL:** `/api/login`
/// - **Method:** `POST`
/// - **Purpose:** Verifies the shared admin password
/// - **Authentication:** None required
///
/// # Request Format
///
/// ```json
/// { "password": "the admin password" }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "success": true }
/// ```
/// The session cookie is set if the caller did not have one yet.
///
/// **Failure (HTTP 401 Unauthorized):**
/// ```json
/// { "error": "Invalid password" }
/// ```
///
/// Failed attempts are not rate limited and never change the session. An
/// empty or unreadable body counts as a missing password.
///
/// # Example
///
/// ```js
/// const response = await fetch('/api/login', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ password: 'hunter2' }),
///   credentials: 'include'
/// });
/// ```
#[post("/login", data = "<login>", rank = 2)]
pub async fn login(
    ctx: SessionContext,
    store: &State<SessionStore>,
    config: &State<AppConfig>,
    login: Result<Json<LoginRequest>, json::Error<'_>>,
) -> Result<Json<AuthSuccess>, ApiError> {
    let login = match login {
        Ok(login) => login.into_inner(),
        Err(e) => {
            warn!("Unreadable login body: {}", e);
            LoginRequest::default()
        }
    };
    process_login(store, config, &ctx.session, &login)?;
    Ok(Json(AuthSuccess::ok()))
}

/// Login endpoint for `application/x-www-form-urlencoded` bodies
/// (`password=...`). Same responses as [`login`].
#[post("/login", format = "form", data = "<login>", rank = 1)]
pub async fn login_form(
    ctx: SessionContext,
    store: &State<SessionStore>,
    config: &State<AppConfig>,
    login: Form<LoginRequest>,
) -> Result<Json<AuthSuccess>, ApiError> {
    process_login(store, config, &ctx.session, &login)?;
    Ok(Json(AuthSuccess::ok()))
}

/// Authentication Check endpoint.
///
/// - **URL:** `/api/check-auth`
/// - **Method:** `GET`
/// - **Purpose:** Tells the admin page whether to show the dashboard or the login form
/// - **Authentication:** None required
///
/// Never fails. A missing or expired session reports `false`.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "isAdmin": true }
/// ```
#[get("/check-auth")]
pub fn check_auth(ctx: SessionContext) -> Json<AuthStatus> {
    Json(AuthStatus {
        is_admin: ctx.session.admin,
    })
}

pub fn routes() -> Vec<Route> {
    routes![login, login_form, check_auth]
}
