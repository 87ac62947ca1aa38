/*

Session termination. Logging out always succeeds, whether or not the
caller had a session to begin with.

*/

use rocket::http::CookieJar;

use crate::sessions::{SessionStore, remove_session_cookie, session_id_from_cookies};

/// Destroys the caller's session and clears the cookie.
///
/// Returns whether a live session was actually removed.
pub fn end_session(store: &SessionStore, cookies: &CookieJar<'_>) -> bool {
    let destroyed = match session_id_from_cookies(cookies) {
        Some(session_id) => {
            let destroyed = store.destroy(&session_id);
            if destroyed {
                info!("Session {} logged out", session_id);
            }
            destroyed
        }
        None => false,
    };

    remove_session_cookie(cookies);
    destroyed
}
