//! API endpoints for rider entries.
//!
//! Riders submit entries without logging in; listing entries and riders is
//! restricted to the admin session.

use rocket::form::Form;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::{FromForm, Route};

use crate::error::ApiError;
use crate::models::{Entry, EntryCreated, EntryFilter, EntryForm, EntrySubmission};
use crate::orm::DbConn;
use crate::orm::entry::{list_entries as load_entries, list_rider_names, submit_entry};
use crate::session_guards::AdminSession;

/// Query string accepted by `GET /api/entries`.
#[derive(Debug, Default, FromForm)]
pub struct EntryQuery {
    #[field(name = "startDate")]
    pub start_date: Option<String>,
    #[field(name = "endDate")]
    pub end_date: Option<String>,
    pub rider: Option<String>,
}

impl From<EntryQuery> for EntryFilter {
    fn from(query: EntryQuery) -> Self {
        EntryFilter::new(query.start_date, query.end_date, query.rider)
    }
}

/// Submit Entry endpoint.
///
/// - **URL:** `/api/entries`
/// - **Method:** `POST`
/// - **Purpose:** Stores one rider's trip record
/// - **Authentication:** None required
///
/// # Request Format
///
/// ```json
/// {
///   "date": "2024-03-01",
///   "riderName": "Jo",
///   "tripCount": 5,
///   "incidents": "flat tyre"
/// }
/// ```
///
/// `tripCount` and `incidents` are optional and default to `0` and `""`.
/// An empty or unreadable body is treated as one with no fields. The same
/// fields are also accepted url-encoded, see [`create_entry_form`].
///
/// # Response
///
/// **Success (HTTP 201 Created):**
/// ```json
/// { "id": 1, "message": "Entry saved" }
/// ```
///
/// **Failure (HTTP 400 Bad Request):**
/// ```json
/// { "error": "Date and riderName required" }
/// ```
///
/// **Failure (HTTP 500 Internal Server Error):**
/// ```json
/// { "error": "DB error" }
/// ```
#[post("/entries", data = "<submission>", rank = 2)]
pub async fn create_entry(
    db: DbConn,
    submission: Result<Json<EntrySubmission>, json::Error<'_>>,
) -> Result<status::Created<Json<EntryCreated>>, ApiError> {
    let submission = match submission {
        Ok(submission) => submission.into_inner(),
        Err(e) => {
            warn!("Unreadable entry body: {}", e);
            EntrySubmission::default()
        }
    };
    save_entry(db, submission).await
}

/// Submit Entry endpoint for `application/x-www-form-urlencoded` bodies.
///
/// Same fields, validation and responses as [`create_entry`].
#[post("/entries", format = "form", data = "<form>", rank = 1)]
pub async fn create_entry_form(
    db: DbConn,
    form: Form<EntryForm>,
) -> Result<status::Created<Json<EntryCreated>>, ApiError> {
    save_entry(db, form.into_inner().into()).await
}

async fn save_entry(
    db: DbConn,
    submission: EntrySubmission,
) -> Result<status::Created<Json<EntryCreated>>, ApiError> {
    let id = db.run(move |conn| submit_entry(conn, submission)).await?;

    info!("Saved entry {}", id);
    Ok(status::Created::new("/api/entries").body(Json(EntryCreated {
        id,
        message: "Entry saved",
    })))
}

/// List Entries endpoint.
///
/// - **URL:** `/api/entries?startDate=&endDate=&rider=`
/// - **Method:** `GET`
/// - **Purpose:** Lists stored entries, newest date first
/// - **Authentication:** Admin session required
///
/// All parameters are optional and combine with AND:
/// - `startDate` / `endDate` - inclusive bounds on `date`
/// - `rider` - substring that must appear in `riderName`
///
/// Empty parameters are ignored.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// [
///   {
///     "id": 1,
///     "date": "2024-03-01",
///     "riderName": "Jo",
///     "tripCount": 5,
///     "incidents": "",
///     "createdAt": "2024-03-01T08:15:02.125341"
///   }
/// ]
/// ```
///
/// **Failure (HTTP 401 Unauthorized):** no admin session.
#[get("/entries?<query..>")]
pub async fn list_entries(
    _admin: AdminSession,
    query: EntryQuery,
    db: DbConn,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let filter = EntryFilter::from(query);
    let entries = db.run(move |conn| load_entries(conn, &filter)).await?;
    Ok(Json(entries))
}

/// List Riders endpoint.
///
/// - **URL:** `/api/riders`
/// - **Method:** `GET`
/// - **Purpose:** Distinct rider names for the admin filter dropdown, sorted
/// - **Authentication:** Admin session required
#[get("/riders")]
pub async fn list_riders(_admin: AdminSession, db: DbConn) -> Result<Json<Vec<String>>, ApiError> {
    let riders = db.run(list_rider_names).await?;
    Ok(Json(riders))
}

pub fn routes() -> Vec<Route> {
    routes![create_entry, create_entry_form, list_entries, list_riders]
}
