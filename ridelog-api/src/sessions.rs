//! Server-side session state.
//!
//! A session is an opaque UUID carried in the private `session` cookie. The
//! server keeps one record per session holding the admin flag and a fixed
//! expiry; activity never extends it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDateTime, TimeDelta, Utc};
use rocket::http::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub admin: bool,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl Session {
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        now >= self.expires_at
    }
}

/// In-memory session store, shared across requests as Rocket managed state.
#[derive(Debug)]
pub struct SessionStore {
    ttl: TimeDelta,
    sessions: RwLock<HashMap<String, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::new(TimeDelta::hours(SESSION_TTL_HOURS))
    }
}

impl SessionStore {
    pub fn new(ttl: TimeDelta) -> Self {
        SessionStore {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    // Poisoning is ignored: every write is a single map operation.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a new non-admin session and drops any expired ones.
    pub fn create(&self) -> Session {
        let now = Utc::now().naive_utc();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            admin: false,
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.write();
        sessions.retain(|_, s| !s.is_expired_at(now));
        sessions.insert(session.id.clone(), session.clone());
        session
    }

    /// Looks up a live session. Missing and expired sessions are both `None`.
    pub fn get(&self, id: &str) -> Option<Session> {
        let now = Utc::now().naive_utc();
        self.read()
            .get(id)
            .filter(|s| !s.is_expired_at(now))
            .cloned()
    }

    /// Sets the admin flag. Returns `false` if the session is gone or expired.
    pub fn set_admin(&self, id: &str, admin: bool) -> bool {
        let now = Utc::now().naive_utc();
        match self.write().get_mut(id) {
            Some(session) if !session.is_expired_at(now) => {
                session.admin = admin;
                true
            }
            _ => false,
        }
    }

    /// Removes a session immediately. Returns whether it existed.
    pub fn destroy(&self, id: &str) -> bool {
        self.write().remove(id).is_some()
    }

    /// Number of sessions that have not yet expired.
    pub fn active_count(&self) -> usize {
        let now = Utc::now().naive_utc();
        self.read().values().filter(|s| !s.is_expired_at(now)).count()
    }
}

/// Sets the session cookie in the response.
///
/// The cookie is private (encrypted and authenticated with Rocket's
/// `secret_key`), HTTP-only, `SameSite=Lax`, valid for the whole site and
/// lives as long as the session. It is not marked `Secure` so the service
/// keeps working behind plain HTTP.
pub fn set_session_cookie(cookies: &CookieJar<'_>, session: &Session, ttl: TimeDelta) {
    let cookie = Cookie::build((SESSION_COOKIE, session.id.clone()))
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(rocket::time::Duration::seconds(ttl.num_seconds()))
        .build();
    cookies.add_private(cookie);
}

/// Reads the session id from the private session cookie, if any.
pub fn session_id_from_cookies(cookies: &CookieJar<'_>) -> Option<String> {
    cookies
        .get_private(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

pub fn remove_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::build(SESSION_COOKIE).path("/"));
}
