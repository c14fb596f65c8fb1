#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use ki_client::KiClient;
use mockito::{self, Matcher};
use serde_json::json;
use shared_types::Properties;

const CONFIG_BODY: &str = r#"{
    "id": "database",
    "name": "Database",
    "lastModified": "2024-01-01T00:00:00Z",
    "version": 3,
    "group": "myapp",
    "properties": {"host": "localhost", "port": 5432}
}"#;

#[tokio::test]
async fn test_health_check() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status":"OK","service":"ki"}"#)
        .create();

    let client = KiClient::new(server.url()).unwrap();
    let healthy = client.health_check().await.unwrap();
    assert!(healthy);
}

#[tokio::test]
async fn test_health_check_unhealthy() {
    let mut server = mockito::Server::new_async().await;

    let _m = server.mock("GET", "/health").with_status(503).create();

    let client = KiClient::new(server.url()).unwrap();
    assert!(!client.health_check().await.unwrap());
}

#[tokio::test]
async fn test_create_group() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("PUT", "/config/myapp")
        .with_status(200)
        .with_body(r#"{"id": "myapp", "configs": []}"#)
        .create();

    let client = KiClient::new(server.url()).unwrap();
    let group = client.create_group("myapp").await.unwrap();

    assert_eq!(group.id, "myapp");
    assert!(group.configs.is_empty());
}

#[tokio::test]
async fn test_create_group_conflict() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("PUT", "/config/myapp")
        .with_status(409)
        .with_body(r#"{"error": "Conflict", "details": "Group already exists and is not overwritable: myapp"}"#)
        .create();

    let client = KiClient::new(server.url()).unwrap();
    let result = client.create_group("myapp").await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[tokio::test]
async fn test_get_group() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/config/myapp")
        .with_status(200)
        .with_body(r#"{"id": "myapp", "configs": ["database", "cache"]}"#)
        .create();

    let client = KiClient::new(server.url()).unwrap();
    let group = client.get_group("myapp").await.unwrap();

    assert_eq!(group.configs, vec!["database", "cache"]);
}

#[tokio::test]
async fn test_get_group_not_found() {
    let mut server = mockito::Server::new_async().await;

    let _m = server.mock("GET", "/config/missing").with_status(404).create();

    let client = KiClient::new(server.url()).unwrap();
    let result = client.get_group("missing").await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Group not found"));
}

#[tokio::test]
async fn test_put_config() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("PUT", "/config/myapp/database")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "name": "Database",
            "version": 3,
            "properties": {"host": "localhost", "port": 5432}
        })))
        .with_status(200)
        .with_body(CONFIG_BODY)
        .create();

    let client = KiClient::new(server.url()).unwrap();
    let properties = Properties::from_json(r#"{"host": "localhost", "port": 5432}"#).unwrap();

    let config = client
        .put_config("myapp", "database", "Database", 3, &properties)
        .await
        .unwrap();

    assert_eq!(config.id, "database");
    assert_eq!(config.group, "myapp");
    assert_eq!(config.version, 3);
}

#[tokio::test]
async fn test_put_config_missing_group() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("PUT", "/config/missing/database")
        .with_status(404)
        .create();

    let client = KiClient::new(server.url()).unwrap();
    let result = client
        .put_config("missing", "database", "", 0, &Properties::default())
        .await;

    assert!(result.unwrap_err().to_string().contains("Group not found"));
}

#[tokio::test]
async fn test_get_config() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/config/myapp/database")
        .with_status(200)
        .with_body(CONFIG_BODY)
        .create();

    let client = KiClient::new(server.url()).unwrap();
    let config = client.get_config("myapp", "database").await.unwrap();

    assert_eq!(config.name, "Database");
    assert_eq!(
        config.properties.as_str(),
        r#"{"host": "localhost", "port": 5432}"#
    );
}

#[tokio::test]
async fn test_get_config_not_found() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/config/myapp/missing")
        .with_status(404)
        .create();

    let client = KiClient::new(server.url()).unwrap();
    let result = client.get_config("myapp", "missing").await;

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Config not found: myapp/missing"));
}

#[tokio::test]
async fn test_server_error_carries_details() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/config/bad")
        .with_status(400)
        .with_body(r#"{"error": "Bad request", "details": "Invalid id: bad"}"#)
        .create();

    let client = KiClient::new(server.url()).unwrap();
    let message = client.get_group("bad").await.unwrap_err().to_string();

    assert!(message.contains("400"), "{message}");
    assert!(message.contains("Invalid id: bad"), "{message}");
}

#[tokio::test]
async fn test_ids_are_percent_encoded() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/config/my%20app/what%3F")
        .with_status(200)
        .with_body(
            r#"{"id": "what?", "group": "my app", "lastModified": "2024-01-01T00:00:00Z"}"#,
        )
        .create();

    let client = KiClient::new(server.url()).unwrap();
    let config = client.get_config("my app", "what?").await.unwrap();

    assert_eq!(config.id, "what?");
    assert_eq!(config.group, "my app");
}
