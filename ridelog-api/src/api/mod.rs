pub mod entry;
pub mod login;
pub mod logout;
pub mod pages;

use rocket::Route;

/// Every JSON route, to be mounted under `/api`.
pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(entry::routes());
    routes.extend(login::routes());
    routes.extend(logout::routes());
    routes
}
