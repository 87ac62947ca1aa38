use rocket::FromForm;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Body of `POST /api/login`.
#[derive(Clone, Default, Deserialize, FromForm, TS)]
#[ts(export)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

// The password must never show up in logs.
impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct AuthSuccess {
    pub success: bool,
}

impl AuthSuccess {
    pub fn ok() -> Self {
        AuthSuccess { success: true }
    }
}

/// Response of `GET /api/check-auth`.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthStatus {
    pub is_admin: bool,
}
