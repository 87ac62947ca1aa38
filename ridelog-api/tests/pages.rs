use std::path::PathBuf;

use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::Value;

use ridelog_api::orm::testing::{test_config, test_rocket, test_rocket_with};

#[tokio::test]
async fn test_root_redirects_to_rider_page() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Found);
    assert_eq!(response.headers().get_one("Location"), Some("/rider"));
}

#[tokio::test]
async fn test_pages_are_served() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    for (uri, marker) in [("/rider", "entry-form"), ("/admin", "login-form")] {
        let response = client.get(uri).dispatch().await;
        assert_eq!(response.status(), Status::Ok, "{}", uri);
        assert_eq!(response.content_type(), Some(ContentType::HTML));
        let body = response.into_string().await.unwrap();
        assert!(body.contains(marker), "{} should contain {}", uri, marker);
    }

    let response = client.get("/style.css").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::CSS));
}

#[tokio::test]
async fn test_pages_are_public() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    // No login needed, even though the admin page lists protected data
    let response = client.get("/admin").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let response = client.get("/api/entries").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_unknown_route_returns_json_error() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    for uri in ["/nope", "/api/nope"] {
        let response = client.get(uri).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "Not Found");
    }
}

#[tokio::test]
async fn test_missing_static_dir() {
    let mut config = test_config();
    config.static_dir = PathBuf::from("/nonexistent/ridelog/static");
    let client = Client::tracked(test_rocket_with(config)).await.unwrap();

    let response = client.get("/rider").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    // The API keeps working without the pages
    let response = client.get("/api/check-auth").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}
