/*
Page routes. The HTML itself lives in the configured static directory.
*/

use rocket::fs::NamedFile;
use rocket::response::Redirect;
use rocket::{Route, State};

use crate::config::AppConfig;

#[get("/")]
pub fn index() -> Redirect {
    Redirect::found("/rider")
}

async fn page(config: &AppConfig, file: &str) -> Option<NamedFile> {
    let path = config.static_dir.join(file);
    match NamedFile::open(&path).await {
        Ok(file) => Some(file),
        Err(e) => {
            warn!("Cannot open {}: {}", path.display(), e);
            None
        }
    }
}

/// Rider submission form.
#[get("/rider")]
pub async fn rider_page(config: &State<AppConfig>) -> Option<NamedFile> {
    page(config, "rider.html").await
}

/// Admin dashboard.
#[get("/admin")]
pub async fn admin_page(config: &State<AppConfig>) -> Option<NamedFile> {
    page(config, "admin.html").await
}

pub fn routes() -> Vec<Route> {
    routes![index, rider_page, admin_page]
}
