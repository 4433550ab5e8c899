//! Site settings: loading, editing by key path, saving and reset.

use std::time::Duration;

use quillpost::services::backend_client::BackendClient;
use quillpost::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use quillpost::types::errors::SettingsError;
use quillpost::types::settings::{SiteSettings, ThemeMode};
use rstest::rstest;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let client = BackendClient::new(&server.uri(), "anon", Duration::from_secs(5)).unwrap();
    (server, client)
}

#[tokio::test]
async fn test_load_reads_row_one() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/site_settings"))
        .and(query_param("id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "site_name": "Field Notes",
            "tagline": "Small essays",
            "posts_per_page": 6,
            "appearance": {"theme": "dark", "accent_color": "#10b981"}
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine = SettingsEngine::new();
    let settings = engine.load(&client).await.unwrap();
    assert_eq!(settings.site_name, "Field Notes");
    assert_eq!(settings.posts_per_page, 6);
    assert_eq!(settings.appearance.theme, ThemeMode::Dark);
    // Columns absent from the row keep their defaults.
    assert!(settings.comments_enabled);
    assert_eq!(engine.get_settings(), &settings);
}

#[tokio::test]
async fn test_load_missing_row_gives_defaults() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/site_settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut engine = SettingsEngine::new();
    assert_eq!(engine.load(&client).await.unwrap(), SiteSettings::default());
}

#[tokio::test]
async fn test_load_failure_keeps_previous_settings() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/site_settings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut engine = SettingsEngine::new();
    engine.set_value("site_name", json!("Local edit")).unwrap();
    let err = engine.load(&client).await.unwrap_err();
    assert!(matches!(err, SettingsError::Backend(_)));
    assert_eq!(engine.get_settings().site_name, "Local edit");
}

#[tokio::test]
async fn test_save_upserts_with_admin_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/site_settings"))
        .and(header("authorization", "Bearer admin-jwt"))
        .and(headers("prefer", vec!["resolution=merge-duplicates", "return=representation"]))
        .and(body_partial_json(json!({"id": 1, "site_name": "Renamed"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 1,
            "site_name": "Renamed"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine = SettingsEngine::new();
    engine.set_value("site_name", json!("Renamed")).unwrap();
    engine.save(&client.with_access_token("admin-jwt")).await.unwrap();
    assert_eq!(engine.get_settings().site_name, "Renamed");
}

#[rstest]
#[case("site_name", json!("Another"))]
#[case("posts_per_page", json!(12))]
#[case("comments_enabled", json!(false))]
#[case("appearance.theme", json!("light"))]
#[case("appearance.accent_color", json!("#f43f5e"))]
#[case("social_links.github", json!("https://github.com/quill"))]
fn test_set_value_accepts(#[case] key: &str, #[case] value: Value) {
    let mut engine = SettingsEngine::new();
    engine.set_value(key, value.clone()).unwrap();

    let mut current = serde_json::to_value(engine.get_settings()).unwrap();
    for part in key.split('.') {
        current = current[part].clone();
    }
    assert_eq!(current, value);
}

#[rstest]
#[case("nonexistent", json!(1))]
#[case("appearance.sparkles", json!(true))]
#[case("appearance..theme", json!("dark"))]
#[case("social_links.github.extra", json!("x"))]
fn test_set_value_rejects_bad_keys(#[case] key: &str, #[case] value: Value) {
    let mut engine = SettingsEngine::new();
    assert!(matches!(engine.set_value(key, value), Err(SettingsError::InvalidKey(_))));
}

#[rstest]
#[case("posts_per_page", json!(-1))]
#[case("posts_per_page", json!(0))]
#[case("appearance.theme", json!("neon"))]
#[case("comments_enabled", json!("yes"))]
fn test_set_value_rejects_bad_values(#[case] key: &str, #[case] value: Value) {
    let mut engine = SettingsEngine::new();
    assert!(matches!(engine.set_value(key, value), Err(SettingsError::InvalidValue(_))));
    assert_eq!(engine.get_settings(), &SiteSettings::default());
}
