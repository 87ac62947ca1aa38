//! API endpoint for admin logout and session termination.

use rocket::http::CookieJar;
use rocket::serde::json::Json;
use rocket::{Route, State};

use crate::auth::logout::end_session;
use crate::models::AuthSuccess;
use crate::sessions::SessionStore;

/// Logout endpoint that terminates the caller's session.
///
/// - **URL:** `/api/logout`
/// - **Method:** `POST`
/// - **Purpose:** Destroys the current session and removes the session cookie
/// - **Authentication:** None required (works with or without a valid session)
///
/// # Response
///
/// **Always HTTP 200 OK:**
/// ```json
/// { "success": true }
/// ```
#[post("/logout")]
pub fn logout(store: &State<SessionStore>, cookies: &CookieJar<'_>) -> Json<AuthSuccess> {
    end_session(store, cookies);
    Json(AuthSuccess::ok())
}

pub fn routes() -> Vec<Route> {
    routes![logout]
}
