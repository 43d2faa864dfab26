//! Integration tests for health, static files and admin routes

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::configuration::{ApplicationSettings, AuthSettings, Platform};
use chirpy::startup::run;
use chirpy::store::InMemoryStore;
use serde_json::json;

fn spawn_app(platform: Platform) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let application = ApplicationSettings {
        host: "127.0.0.1".to_string(),
        port,
        platform,
        filepath_root: "./public".to_string(),
    };
    let auth = AuthSettings {
        jwt_secret: "integration-test-secret".to_string(),
        polka_key: "integration-test-polka-key".to_string(),
        access_token_ttl_seconds: 3600,
        refresh_token_ttl_days: 60,
    };

    let server = run(listener, Arc::new(InMemoryStore::new()), application, auth)
        .expect("Failed to create server");
    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

async fn visits(client: &reqwest::Client, addr: &str) -> String {
    client
        .get(&format!("{}/admin/metrics", addr))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app(Platform::Dev);

    let response = reqwest::Client::new()
        .get(&format!("{}/api/healthz", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn file_server_hits_are_counted() {
    let addr = spawn_app(Platform::Dev);
    let client = reqwest::Client::new();

    assert!(visits(&client, &addr).await.contains("visited 0 times"));

    for _ in 0..2 {
        let response = client
            .get(&format!("{}/app/", addr))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(200, response.status().as_u16());
        assert!(response.text().await.unwrap().contains("Welcome to Chirpy"));
    }

    assert!(visits(&client, &addr).await.contains("visited 2 times"));
}

#[tokio::test]
async fn health_check_is_not_counted() {
    let addr = spawn_app(Platform::Dev);
    let client = reqwest::Client::new();

    client
        .get(&format!("{}/api/healthz", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(visits(&client, &addr).await.contains("visited 0 times"));
}

#[tokio::test]
async fn reset_clears_hits_and_users_in_dev() {
    let addr = spawn_app(Platform::Dev);
    let client = reqwest::Client::new();

    client.get(&format!("{}/app/", addr)).send().await.unwrap();
    let response = client
        .post(&format!("{}/api/users", addr))
        .json(&json!({"email": "walt@breakingbad.com", "password": "04234"}))
        .send()
        .await
        .unwrap();
    assert_eq!(201, response.status().as_u16());

    let response = client
        .post(&format!("{}/admin/reset", addr))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    assert!(visits(&client, &addr).await.contains("visited 0 times"));

    let response = client
        .post(&format!("{}/api/login", addr))
        .json(&json!({"email": "walt@breakingbad.com", "password": "04234"}))
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16(), "User should be gone after reset");
}

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let addr = spawn_app(Platform::Production);
    let client = reqwest::Client::new();

    client.get(&format!("{}/app/", addr)).send().await.unwrap();

    let response = client
        .post(&format!("{}/admin/reset", addr))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(403, response.status().as_u16());

    assert!(visits(&client, &addr).await.contains("visited 1 times"));
}
