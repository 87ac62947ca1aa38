use std::path::PathBuf;

use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket};
use uuid::Uuid;

use super::db::run_pending_migrations;
use crate::config::AppConfig;

/// Admin secret used by [`test_config`] and [`test_rocket`].
pub const TEST_ADMIN_PASSWORD: &str = "letmein";

/// A configuration suitable for tests: fixed admin password, a unique
/// shared in-memory database and the crate's bundled static pages.
pub fn test_config() -> AppConfig {
    AppConfig {
        admin_password: Some(TEST_ADMIN_PASSWORD.to_string()),
        session_secret: "ridelog-test-session-secret".to_string(),
        port: None,
        database_url: format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4()),
        static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
    }
}

/// Creates and configures a Rocket instance for testing with an in-memory SQLite database.
///
/// The returned Rocket instance will have:
/// - A unique shared in-memory SQLite database configured
/// - Database connection pool attached
/// - All migrations run
/// - A fresh session store
/// - API and page routes mounted
pub fn test_rocket() -> Rocket<Build> {
    test_rocket_with(test_config())
}

/// Like [`test_rocket`], with a caller-supplied configuration.
pub fn test_rocket_with(config: AppConfig) -> Rocket<Build> {
    let db_config: Map<_, Value> = map! {
        "url" => config.database_url.clone().into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };

    let figment = config.apply(
        rocket::Config::figment().merge(("databases", map!["sqlite_db" => db_config])),
    );

    crate::build_rocket(figment, config)
}

/// Creates a synchronous in-memory SQLite database connection for unit tests.
///
/// This function returns a `diesel::SqliteConnection` connected to an in-memory SQLite database
/// with all embedded Diesel migrations applied. This is ideal for direct Diesel queries in
/// synchronous test code.
///
/// Each call to this function returns a new, independent in-memory database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    run_pending_migrations(&mut conn).expect("Failed to run pending migrations");
    conn
}
