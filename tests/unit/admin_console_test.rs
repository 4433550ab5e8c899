//! Admin sign-in, article management and analytics against a mock backend.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use quillpost::database::{Database, LocalStorage};
use quillpost::services::admin_auth::{login, AdminSessionStore, DEFAULT_SESSION_SECS};
use quillpost::services::admin_console::{prepare_draft, AdminConsole};
use quillpost::services::analytics::AnalyticsService;
use quillpost::services::backend_client::BackendClient;
use quillpost::types::admin::AdminSession;
use quillpost::types::article::{Article, ArticleDraft, ArticleStatus};
use quillpost::types::errors::{AuthError, BackendError, ValidationError};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeroize::Zeroizing;

const NOW: i64 = 1_780_000_000;

fn session() -> AdminSession {
    AdminSession {
        admin_id: "adm-1".to_string(),
        username: "editor".to_string(),
        access_token: "admin-jwt".to_string(),
        expires_at: NOW + 3600,
    }
}

fn stored_article(id: &str, status: &str, published_at: Option<&str>) -> Value {
    json!({
        "id": id,
        "title": "Stored",
        "slug": "stored",
        "content": "<p>body</p>",
        "status": status,
        "created_at": "2026-01-01T00:00:00Z",
        "published_at": published_at
    })
}

fn draft(title: &str, status: ArticleStatus) -> ArticleDraft {
    ArticleDraft {
        title: title.to_string(),
        content: "<p>Some words here</p>".to_string(),
        status,
        ..ArticleDraft::default()
    }
}

async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let client = BackendClient::new(&server.uri(), "anon", Duration::from_secs(5)).unwrap();
    (server, client)
}

// === Sign-in ===

#[tokio::test]
async fn test_login_success_creates_session() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/admin_login"))
        .and(body_json(json!({"p_username": "editor", "p_password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "admin_id": "adm-1",
            "username": "editor",
            "access_token": "admin-jwt"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = login(&client, " editor ", Zeroizing::new("s3cret".to_string()), NOW)
        .await
        .unwrap();
    assert_eq!(session.username, "editor");
    assert_eq!(session.expires_at, NOW + DEFAULT_SESSION_SECS);
}

#[tokio::test]
async fn test_login_huge_lifetime_saturates() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/admin_login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "admin_id": "adm-1",
            "username": "editor",
            "access_token": "admin-jwt",
            "expires_in": i64::MAX
        })))
        .mount(&server)
        .await;

    let session = login(&client, "editor", Zeroizing::new("s3cret".to_string()), NOW)
        .await
        .unwrap();
    assert_eq!(session.expires_at, i64::MAX);
    assert!(!session.is_expired(NOW));
}

#[tokio::test]
async fn test_login_null_result_is_invalid_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/admin_login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .mount(&server)
        .await;

    let err = login(&client, "editor", Zeroizing::new("wrong".to_string()), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_login_empty_password_skips_backend() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = login(&client, "editor", Zeroizing::new(String::new()), NOW)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[test]
fn test_require_distinguishes_expired_from_absent() {
    let db = Database::open_in_memory().unwrap();
    let store = AdminSessionStore::new(LocalStorage::new(db.connection()));

    assert!(matches!(store.require(NOW), Err(AuthError::NotAuthenticated)));

    store.save(&session()).unwrap();
    assert_eq!(store.require(NOW).unwrap().username, "editor");
    assert!(matches!(store.require(NOW + 7200), Err(AuthError::SessionExpired)));
    // The expired record was removed.
    assert!(matches!(store.require(NOW), Err(AuthError::NotAuthenticated)));
}

// === Draft preparation ===

#[test]
fn test_prepare_keeps_first_publication_date() {
    let first = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap();
    let existing: Article = serde_json::from_value(stored_article("a1", "published", Some("2026-02-01T08:00:00Z"))).unwrap();

    let payload = prepare_draft(&draft("Edited", ArticleStatus::Published), Some(&existing), now).unwrap();
    assert_eq!(payload.published_at, Some(first));
    assert_eq!(payload.updated_at, now);

    let unpublished = prepare_draft(&draft("Edited", ArticleStatus::Draft), Some(&existing), now).unwrap();
    assert_eq!(unpublished.published_at, Some(first));
}

#[test]
fn test_prepare_new_draft_has_no_publication_date() {
    let payload = prepare_draft(&draft("Fresh idea", ArticleStatus::Draft), None, Utc::now()).unwrap();
    assert_eq!(payload.published_at, None);
    assert_eq!(payload.slug, "fresh-idea");
    assert_eq!(payload.excerpt, "Some words here");
    assert_eq!(payload.read_time, 1);
}

#[test]
fn test_prepare_title_too_long() {
    let err = prepare_draft(&draft(&"t".repeat(201), ArticleStatus::Draft), None, Utc::now()).unwrap_err();
    assert_eq!(err, ValidationError::TooLong { field: "title", max: 200 });
}

// === Console requests ===

#[tokio::test]
async fn test_create_sends_admin_token_and_derived_fields() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/articles"))
        .and(header("authorization", "Bearer admin-jwt"))
        .and(body_partial_json(json!({
            "title": "Hello World",
            "slug": "hello-world",
            "status": "published",
            "read_time": 1
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            stored_article("new-1", "published", Some("2026-09-01T00:00:00Z"))
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let console = AdminConsole::new(&client, &session());
    let article = console
        .create(&draft("Hello World", ArticleStatus::Published))
        .await
        .unwrap();
    assert_eq!(article.id, "new-1");
    assert!(article.is_published());
}

#[tokio::test]
async fn test_create_invalid_draft_is_validation_error() {
    let (_server, client) = setup().await;
    let console = AdminConsole::new(&client, &session());

    let err = console.create(&draft("  ", ArticleStatus::Draft)).await.unwrap_err();
    assert!(matches!(err, BackendError::Validation(ValidationError::Required("title"))));
}

#[tokio::test]
async fn test_update_patches_by_id() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/articles"))
        .and(query_param("id", "eq.a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_article("a1", "draft", None)])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/articles"))
        .and(query_param("id", "eq.a1"))
        .and(body_partial_json(json!({"title": "Renamed", "slug": "renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_article("a1", "draft", None)])))
        .expect(1)
        .mount(&server)
        .await;

    let console = AdminConsole::new(&client, &session());
    let article = console.update("a1", &draft("Renamed", ArticleStatus::Draft)).await.unwrap();
    assert_eq!(article.id, "a1");
}

#[tokio::test]
async fn test_expired_token_maps_to_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/articles"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "JWT expired"})))
        .mount(&server)
        .await;

    let console = AdminConsole::new(&client, &session());
    let err = console.delete("a1").await.unwrap_err();
    assert!(matches!(err, BackendError::Unauthorized(ref m) if m == "JWT expired"));
}

// === Analytics ===

#[tokio::test]
async fn test_analytics_report_aggregates() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "title": "A", "slug": "a", "status": "published", "category": "Rust",
             "view_count": 40, "like_count": 2, "created_at": "2026-01-01T00:00:00Z"},
            {"id": "2", "title": "B", "slug": "b", "status": "draft",
             "view_count": 0, "like_count": 0, "created_at": "2026-01-02T00:00:00Z"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"status": "approved"}, {"status": "pending"}, {"status": "pending"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/article_views"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"article_id": "1", "viewed_at": Utc::now()}
        ])))
        .mount(&server)
        .await;

    let report = AnalyticsService::new(client.with_access_token("admin-jwt"))
        .report(7, 5)
        .await
        .unwrap();

    assert_eq!(report.stats.total_articles, 2);
    assert_eq!(report.stats.published_articles, 1);
    assert_eq!(report.stats.draft_articles, 1);
    assert_eq!(report.stats.total_views, 40);
    assert_eq!(report.stats.pending_comments, 2);
    assert_eq!(report.top_articles[0].id, "1");
    assert_eq!(report.categories.len(), 2);
    assert_eq!(report.daily_views.len(), 7);
    assert_eq!(report.daily_views.iter().map(|d| d.views).sum::<u64>(), 1);
    assert_eq!(report.daily_views.last().unwrap().views, 1);
}
