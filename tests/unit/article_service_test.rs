//! Reader-side article operations against a mock backend.

use std::time::Duration;

use chrono::Utc;
use quillpost::services::article_service::{count_categories, pick_related, ArticleService};
use quillpost::services::backend_client::BackendClient;
use quillpost::types::article::{Article, ArticleStatus};
use quillpost::types::errors::BackendError;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article_json(id: &str, slug: &str, category: Option<&str>) -> Value {
    json!({
        "id": id,
        "title": format!("Title {}", id),
        "slug": slug,
        "excerpt": null,
        "content": "<p>Hello</p>",
        "category": category,
        "tags": ["rust"],
        "status": "published",
        "read_time": 2,
        "view_count": 10,
        "like_count": 1,
        "created_at": "2026-05-01T10:00:00Z",
        "published_at": "2026-05-02T10:00:00Z"
    })
}

fn article(id: &str, category: Option<&str>, status: ArticleStatus) -> Article {
    let mut a: Article = serde_json::from_value(article_json(id, id, category)).unwrap();
    a.status = status;
    a
}

async fn setup() -> (MockServer, ArticleService) {
    let server = MockServer::start().await;
    let client = BackendClient::new(&server.uri(), "anon", Duration::from_secs(5)).unwrap();
    (server, ArticleService::new(client))
}

#[tokio::test]
async fn test_list_published_filters_and_orders() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/articles"))
        .and(query_param("status", "eq.published"))
        .and(query_param("order", "published_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            article_json("1", "one", Some("Rust")),
            article_json("2", "two", None)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let articles = service.list_published().await.unwrap();
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(Article::is_published));
    assert_eq!(articles[1].category, None);
}

#[tokio::test]
async fn test_featured_applies_limit() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/articles"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([article_json("1", "one", None)])))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(service.featured(3).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_by_slug() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/articles"))
        .and(query_param("slug", "eq.hello-world"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([article_json("7", "hello-world", None)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/articles"))
        .and(query_param("slug", "eq.nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let found = service.get_by_slug("hello-world").await.unwrap();
    assert_eq!(found.id, "7");

    let missing = service.get_by_slug("nope").await.unwrap_err();
    assert!(matches!(missing, BackendError::NotFound(ref m) if m.contains("nope")));
}

#[tokio::test]
async fn test_toggle_like_and_has_liked() {
    let (server, service) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/toggle_article_like"))
        .and(body_json(json!({"p_article_id": "a1", "p_visitor_id": "v1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"liked": true, "like_count": 5})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/article_likes"))
        .and(query_param("article_id", "eq.a1"))
        .and(query_param("visitor_id", "eq.v1"))
        .respond_with(ResponseTemplate::new(200).insert_header("Content-Range", "0-0/1").set_body_json(json!([])))
        .mount(&server)
        .await;

    let state = service.toggle_like("a1", "v1").await.unwrap();
    assert!(state.liked);
    assert_eq!(state.like_count, 5);
    assert!(service.has_liked("a1", "v1").await.unwrap());
}

#[tokio::test]
async fn test_record_view_failure_surfaces() {
    let (server, service) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/increment_article_views"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
        .mount(&server)
        .await;

    let err = service.record_view("a1").await.unwrap_err();
    assert_eq!(err.to_string(), "Backend error (500): db down");
}

#[test]
fn test_pick_related_prefers_same_category() {
    let current = article("cur", Some("Rust"), ArticleStatus::Published);
    let all = vec![
        current.clone(),
        article("go", Some("Go"), ArticleStatus::Published),
        article("rust1", Some("rust"), ArticleStatus::Published),
        article("draft", Some("Rust"), ArticleStatus::Draft),
        article("rust2", Some("Rust"), ArticleStatus::Published),
    ];

    let related: Vec<String> = pick_related(&all, &current, 3).into_iter().map(|a| a.id).collect();
    assert_eq!(related, vec!["rust1", "rust2", "go"]);
}

#[test]
fn test_pick_related_without_category_falls_back_to_recent() {
    let current = article("cur", None, ArticleStatus::Published);
    let all = vec![
        article("x", None, ArticleStatus::Published),
        current.clone(),
        article("y", Some("Go"), ArticleStatus::Published),
    ];
    let related: Vec<String> = pick_related(&all, &current, 5).into_iter().map(|a| a.id).collect();
    assert_eq!(related, vec!["x", "y"]);
}

#[test]
fn test_count_categories_sorted_by_name() {
    let all = vec![
        article("1", Some("Rust"), ArticleStatus::Published),
        article("2", Some("Design"), ArticleStatus::Published),
        article("3", Some("Rust"), ArticleStatus::Published),
        article("4", None, ArticleStatus::Published),
        article("5", Some("  "), ArticleStatus::Published),
    ];
    let counts: Vec<(String, usize)> = count_categories(&all)
        .into_iter()
        .map(|c| (c.name, c.count))
        .collect();
    assert_eq!(counts, vec![("Design".to_string(), 1), ("Rust".to_string(), 2)]);
}

#[test]
fn test_article_row_defaults() {
    let row: Article = serde_json::from_value(json!({
        "id": "1",
        "title": "Bare",
        "slug": "bare",
        "created_at": Utc::now()
    }))
    .unwrap();
    assert_eq!(row.status, ArticleStatus::Draft);
    assert!(row.tags.is_empty());
    assert_eq!(row.view_count, 0);
}
