use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rocket::fairing::AdHoc;
use rocket_sync_db_pools::{database, diesel};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[database("sqlite_db")]
pub struct DbConn(diesel::SqliteConnection);

/// Runs all pending database migrations on the provided connection.
///
/// Every migration is written with `IF NOT EXISTS`, so this is safe to run
/// on each startup, including against a database created by an older
/// deployment.
///
/// # Arguments
/// * `conn` - A mutable reference to a SQLite database connection
///
/// # Returns
/// * `Ok(usize)` - Number of migrations applied
/// * `Err(_)` - A migration failed to run
pub fn run_pending_migrations(
    conn: &mut diesel::SqliteConnection,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| applied.len())
}

/// Creates a Rocket fairing that runs database migrations on ignition.
///
/// Ignition is aborted if no connection can be obtained or a migration
/// fails, so the server never starts against a half-provisioned schema.
pub fn run_migrations_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Diesel Migrations", |rocket| async {
        let conn = match DbConn::get_one(&rocket).await {
            Some(conn) => conn,
            None => {
                error!("[migrations] ERROR: Could not get DB connection.");
                return Err(rocket);
            }
        };

        match conn.run(run_pending_migrations).await {
            Ok(0) => {
                info!("[migrations] Schema is up to date");
                Ok(rocket)
            }
            Ok(applied) => {
                info!("[migrations] Applied {} migration(s)", applied);
                Ok(rocket)
            }
            Err(e) => {
                error!("[migrations] ERROR: {}", e);
                Err(rocket)
            }
        }
    })
}
