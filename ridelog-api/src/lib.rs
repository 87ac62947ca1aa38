#[macro_use]
extern crate rocket;

use rocket::figment::Figment;
use rocket::figment::value::{Map, Value};
use rocket::fs::FileServer;
use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::Json;
use rocket::{Build, Rocket};

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod orm;
pub use orm::DbConn;
pub mod schema;
pub mod session_guards;
pub mod sessions;

use config::AppConfig;
use error::ErrorResponse;
use sessions::SessionStore;

fn error_body(status: Status) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(status.reason().unwrap_or("Unknown Error")))
}

#[catch(400)]
fn bad_request() -> Json<ErrorResponse> {
    error_body(Status::BadRequest)
}

#[catch(401)]
fn unauthorized() -> Json<ErrorResponse> {
    error_body(Status::Unauthorized)
}

#[catch(404)]
fn not_found(req: &Request) -> Json<ErrorResponse> {
    info!("No route for {} {}", req.method(), req.uri().path());
    error_body(Status::NotFound)
}

#[catch(422)]
fn unprocessable_entity() -> Json<ErrorResponse> {
    error_body(Status::UnprocessableEntity)
}

#[catch(500)]
fn internal_server_error(req: &Request) -> Json<ErrorResponse> {
    error!("Internal error on {} {}", req.method(), req.uri().path());
    error_body(Status::InternalServerError)
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> Json<ErrorResponse> {
    error_body(status)
}

pub fn mount_api_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api", api::routes())
}

/// Mounts the page routes and, if the static directory exists, a file
/// server for the pages' assets.
pub fn mount_page_routes(rocket: Rocket<Build>, config: &AppConfig) -> Rocket<Build> {
    let rocket = rocket.mount("/", api::pages::routes());
    if config.static_dir.is_dir() {
        rocket.mount("/", FileServer::from(&config.static_dir).rank(10))
    } else {
        warn!(
            "Static directory {} not found; pages will return 404",
            config.static_dir.display()
        );
        rocket
    }
}

fn log_rocket_info(rocket: &Rocket<Build>, config: &AppConfig) {
    let figment = rocket.figment();

    if let Ok(address) = figment.extract_inner::<String>("address") {
        info!("Rocket is running at: {}", address);
    }

    if let Ok(port) = figment.extract_inner::<u16>("port") {
        info!("Rocket is listening on port: {}", port);
        info!("Rider form: http://localhost:{}/rider", port);
        info!("Admin dashboard: http://localhost:{}/admin", port);
    }

    match figment.extract_inner::<Map<String, Value>>("databases.sqlite_db") {
        Ok(db_config) => {
            if let Some(Value::String(_, url)) = db_config.get("url") {
                info!("Database URL: {}", url);
            } else {
                warn!("Database URL not found in configuration");
            }
        }
        Err(e) => {
            warn!("Failed to extract database configuration: {}", e);
        }
    }

    info!("Static directory: {}", config.static_dir.display());

    if config.admin_password.is_none() {
        warn!("ADMIN_PASSWORD is not set; admin login is disabled");
    }
    if config.uses_insecure_secret() {
        warn!("SESSION_SECRET is not set; session cookies use an insecure default key");
    }
}

/// Assembles the application on top of an already prepared figment.
///
/// Attaches the database pool and migrations, manages the session store and
/// configuration, registers the JSON catchers and mounts every route.
pub fn build_rocket(figment: Figment, config: AppConfig) -> Rocket<Build> {
    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(orm::run_migrations_fairing())
        .manage(SessionStore::default())
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                unprocessable_entity,
                internal_server_error,
                default_catcher
            ],
        );

    log_rocket_info(&rocket, &config);

    let rocket = mount_page_routes(mount_api_routes(rocket), &config);
    rocket.manage(config)
}

/// Builds the production server from `config`.
///
/// Note that this function doesn't get tested by our tests.  Tests
/// set up the in-memory db through `orm::testing::test_rocket`.
pub fn rocket(config: AppConfig) -> Rocket<Build> {
    let figment = config.figment();
    build_rocket(figment, config)
}
