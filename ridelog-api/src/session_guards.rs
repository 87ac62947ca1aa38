//! Session request guards.
//!
//! Handlers never consult ambient state to decide who is calling. Instead
//! they take one of these guards as an argument:
//!
//! ```rust,ignore
//! use rocket::get;
//! use ridelog_api::session_guards::{AdminSession, SessionContext};
//!
//! #[get("/whoami")]
//! fn whoami(ctx: SessionContext) -> String {
//!     format!("session {} (admin: {})", ctx.session.id, ctx.session.admin)
//! }
//!
//! #[get("/secret")]
//! fn secret(_admin: AdminSession) -> &'static str {
//!     "only admins get here"
//! }
//! ```

use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::sessions::{Session, SessionStore, session_id_from_cookies, set_session_cookie};

/// The caller's session, created on the spot if the request carried none.
///
/// 1. Reads the private `session` cookie
/// 2. Looks the id up in the [`SessionStore`]
/// 3. If the cookie is missing, unreadable, unknown or expired, issues a
///    fresh session and sets its cookie on the response
///
/// The session is resolved once per request and cached, so several guards
/// on the same route share it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session: Session,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionContext {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let store = match request.rocket().state::<SessionStore>() {
            Some(store) => store,
            None => {
                error!("SessionStore is not managed; cannot resolve sessions");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        let session = request.local_cache(|| {
            let cookies = request.cookies();
            match session_id_from_cookies(cookies).and_then(|id| store.get(&id)) {
                Some(session) => session,
                None => {
                    let session = store.create();
                    set_session_cookie(cookies, &session, store.ttl());
                    session
                }
            }
        });

        Outcome::Success(SessionContext {
            session: session.clone(),
        })
    }
}

/// A session whose admin flag is set.
///
/// # Returns
///
/// - `Outcome::Success(AdminSession)` if the caller has logged in
/// - `Outcome::Error(Status::Unauthorized)` otherwise; the protected handler
///   is never run
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session: Session,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminSession {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let ctx = match SessionContext::from_request(request).await {
            Outcome::Success(ctx) => ctx,
            Outcome::Error(e) => return Outcome::Error(e),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        require_admin(ctx.session)
    }
}

/// Admits admin sessions and turns everything else away with 401.
pub fn require_admin(session: Session) -> request::Outcome<AdminSession, ()> {
    if session.admin {
        Outcome::Success(AdminSession { session })
    } else {
        Outcome::Error((Status::Unauthorized, ()))
    }
}
