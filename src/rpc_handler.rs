//! RPC method handler for the Quillpost JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches JSON-RPC method calls to the
//! appropriate managers and services via the `App` struct.
//!
//! The `App` lock is never held across a network call: local work happens in
//! short blocks, and services are cloned out before awaiting.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use zeroize::Zeroizing;

use crate::app::App;
use crate::database::LocalStorage;
use crate::managers::bookmark_manager::{BookmarkManagerTrait, MAX_BOOKMARKS};
use crate::services::admin_auth;
use crate::services::admin_console::AdminConsole;
use crate::services::analytics::AnalyticsService;
use crate::services::comment_service::CommentService;
use crate::services::contact_service::ContactService;
use crate::services::formatting::{format_date, format_relative};
use crate::services::listing::{list_articles, paginate, ArticleFilter, SortOrder};
use crate::services::settings_engine::SettingsEngineTrait;
use crate::services::theme_engine::ThemeEngineTrait;
use crate::services::visitor;
use crate::types::article::{ArticleDraft, ArticleStatus};
use crate::types::bookmark::BookmarkEntry;
use crate::types::comment::{CommentStatus, CommentThread, NewComment};
use crate::types::contact::NewContactMessage;
use crate::types::settings::ThemeMode;

const DEFAULT_RELATED: usize = 3;
const DEFAULT_FEATURED: usize = 3;
const DEFAULT_ANALYTICS_DAYS: u32 = 30;
const DEFAULT_TOP_ARTICLES: usize = 5;

fn lock(app: &Mutex<App>) -> Result<MutexGuard<'_, App>, String> {
    app.lock().map_err(|e| e.to_string())
}

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn usize_param(params: &Value, key: &str) -> Option<usize> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|n| usize::try_from(n).ok())
}

fn from_params<T: DeserializeOwned>(params: &Value) -> Result<T, String> {
    serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {}", e))
}

fn optional_param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<Option<T>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| format!("invalid {}: {}", key, e)),
    }
}

fn now_secs() -> i64 {
    Utc::now().timestamp()
}

fn admin_console(app: &Mutex<App>) -> Result<AdminConsole, String> {
    let a = lock(app)?;
    let session = a.sessions().require(now_secs()).map_err(|e| e.to_string())?;
    Ok(AdminConsole::new(&a.backend, &session))
}

fn theme_state(a: &App) -> Value {
    let engine = &a.theme_engine;
    json!({
        "preferences": engine.preferences(),
        "effective": engine.effective_theme(),
        "css": engine.get_css_variables(),
    })
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Reading list ───
        "bookmark.list" => {
            let a = lock(app)?;
            let mgr = a.bookmarks();
            Ok(json!({
                "items": mgr.list(),
                "count": mgr.len(),
                "remaining": mgr.remaining(),
                "max": MAX_BOOKMARKS,
            }))
        }
        "bookmark.add" => {
            let entry: BookmarkEntry = from_params(params)?;
            let a = lock(app)?;
            let mut mgr = a.bookmarks();
            let outcome = mgr.add(entry).map_err(|e| e.to_string())?;
            Ok(json!({"outcome": outcome, "message": outcome.message(), "remaining": mgr.remaining()}))
        }
        "bookmark.remove" => {
            let id = str_param(params, "id")?;
            let a = lock(app)?;
            let mut mgr = a.bookmarks();
            let outcome = mgr.remove(id).map_err(|e| e.to_string())?;
            Ok(json!({"outcome": outcome, "message": outcome.message(), "remaining": mgr.remaining()}))
        }
        "bookmark.toggle" => {
            let entry: BookmarkEntry = from_params(params)?;
            let a = lock(app)?;
            let mut mgr = a.bookmarks();
            let outcome = mgr.toggle(entry).map_err(|e| e.to_string())?;
            Ok(json!({
                "outcome": outcome,
                "message": outcome.message(),
                "bookmarked": outcome.is_bookmarked(),
                "remaining": mgr.remaining(),
            }))
        }
        "bookmark.is_bookmarked" => {
            let id = str_param(params, "id")?;
            let a = lock(app)?;
            Ok(json!({"bookmarked": a.bookmarks().is_bookmarked(id)}))
        }
        "bookmark.clear" => {
            let a = lock(app)?;
            a.bookmarks().clear().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Articles ───
        "article.list" => {
            let filter: ArticleFilter = optional_param(params, "filter")?.unwrap_or_default();
            let sort: SortOrder = optional_param(params, "sort")?.unwrap_or_default();
            let page = usize_param(params, "page").unwrap_or(1);
            let (service, default_per_page) = {
                let a = lock(app)?;
                let per_page = a.settings_engine.get_settings().posts_per_page as usize;
                (a.articles(), per_page)
            };
            let per_page = usize_param(params, "per_page").unwrap_or(default_per_page);
            let articles = service.list_published().await.map_err(|e| e.to_string())?;
            Ok(json!(list_articles(articles, &filter, sort, page, per_page)))
        }
        "article.featured" => {
            let limit = usize_param(params, "limit").unwrap_or(DEFAULT_FEATURED);
            let service = lock(app)?.articles();
            let articles = service.featured(limit).await.map_err(|e| e.to_string())?;
            Ok(json!(articles))
        }
        "article.get" => {
            let slug = str_param(params, "slug")?;
            let service = lock(app)?.articles();
            let mut article = service.get_by_slug(slug).await.map_err(|e| e.to_string())?;

            let first_view = {
                let a = lock(app)?;
                visitor::mark_viewed(&a.storage(), &article.id).map_err(|e| e.to_string())?
            };
            if first_view {
                match service.record_view(&article.id).await {
                    Ok(()) => article.view_count += 1,
                    Err(e) => {
                        tracing::warn!(%e, article_id = %article.id, "failed to record view");
                        let a = lock(app)?;
                        if let Err(e) = visitor::unmark_viewed(&a.storage(), &article.id) {
                            tracing::warn!(%e, "failed to forget view");
                        }
                    }
                }
            }

            let a = lock(app)?;
            let bookmarked = a.bookmarks().is_bookmarked(&article.id);
            let published_label = article.published_at.as_ref().map(format_date);
            Ok(json!({
                "article": article,
                "bookmarked": bookmarked,
                "published_label": published_label,
            }))
        }
        "article.related" => {
            let slug = str_param(params, "slug")?;
            let limit = usize_param(params, "limit").unwrap_or(DEFAULT_RELATED);
            let service = lock(app)?.articles();
            let article = service.get_by_slug(slug).await.map_err(|e| e.to_string())?;
            let related = service.related(&article, limit).await.map_err(|e| e.to_string())?;
            Ok(json!(related))
        }
        "article.categories" => {
            let service = lock(app)?.articles();
            let categories = service.categories().await.map_err(|e| e.to_string())?;
            Ok(json!(categories))
        }
        "article.like" => {
            let article_id = str_param(params, "article_id")?;
            let (service, visitor_id) = {
                let a = lock(app)?;
                let visitor_id = visitor::visitor_id(&a.storage()).map_err(|e| e.to_string())?;
                (a.articles(), visitor_id)
            };
            let state = service
                .toggle_like(article_id, &visitor_id)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!(state))
        }
        "article.has_liked" => {
            let article_id = str_param(params, "article_id")?;
            let (service, visitor_id) = {
                let a = lock(app)?;
                let visitor_id = visitor::visitor_id(&a.storage()).map_err(|e| e.to_string())?;
                (a.articles(), visitor_id)
            };
            let liked = service
                .has_liked(article_id, &visitor_id)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!({"liked": liked}))
        }

        // ─── Comments ───
        "comment.list" => {
            let article_id = str_param(params, "article_id")?;
            let service = lock(app)?.comments();
            let threads = service
                .threads_for_article(article_id)
                .await
                .map_err(|e| e.to_string())?;
            let now = Utc::now();
            let labels: Vec<Value> = threads
                .iter()
                .map(|t| json!({"id": t.comment.id, "label": format_relative(&t.comment.created_at, &now)}))
                .collect();
            let count: usize = threads.iter().map(CommentThread::total_comments).sum();
            Ok(json!({"threads": threads, "labels": labels, "count": count}))
        }
        "comment.submit" => {
            let new_comment: NewComment = from_params(params)?;
            if !lock(app)?.settings_engine.get_settings().comments_enabled {
                return Err("comments are disabled".to_string());
            }
            let service = lock(app)?.comments();
            let comment = service.submit(&new_comment).await.map_err(|e| e.to_string())?;
            Ok(json!({"comment": comment, "message": "Comment submitted for review"}))
        }

        // ─── Contact ───
        "contact.submit" => {
            let message: NewContactMessage = from_params(params)?;
            let service = lock(app)?.contact();
            let stored = service.submit(&message).await.map_err(|e| e.to_string())?;
            Ok(json!({"id": stored.id, "message": "Message sent"}))
        }

        // ─── Site settings ───
        "settings.get" => {
            let a = lock(app)?;
            Ok(json!(a.settings_engine.get_settings()))
        }
        "settings.reload" => {
            let (mut engine, client) = {
                let a = lock(app)?;
                (a.settings_engine.clone(), a.backend.clone())
            };
            let settings = engine.load(&client).await.map_err(|e| e.to_string())?;
            lock(app)?.settings_engine = engine;
            Ok(json!(settings))
        }

        // ─── Theme ───
        "theme.get" => {
            let a = lock(app)?;
            Ok(theme_state(&a))
        }
        "theme.set" => {
            let mode: Option<ThemeMode> = optional_param(params, "mode")?;
            let accent = params.get("accent_color").and_then(|v| v.as_str());
            let scale = params.get("font_scale").and_then(|v| v.as_f64());

            let mut a = lock(app)?;
            let mut engine = a.theme_engine.clone();
            if let Some(mode) = mode {
                engine.set_theme(mode);
            }
            if let Some(accent) = accent {
                engine.set_accent_color(accent).map_err(|e| e.to_string())?;
            }
            if let Some(scale) = scale {
                engine.set_font_scale(scale as f32).map_err(|e| e.to_string())?;
            }
            engine.save(&a.storage()).map_err(|e| e.to_string())?;
            a.theme_engine = engine;
            Ok(theme_state(&a))
        }
        "theme.system" => {
            let prefers_dark = params
                .get("prefers_dark")
                .and_then(|v| v.as_bool())
                .ok_or("missing prefers_dark")?;
            let mut a = lock(app)?;
            a.theme_engine.set_system_preference(prefers_dark);
            Ok(theme_state(&a))
        }
        "theme.reset" => {
            let mut guard = lock(app)?;
            let a = &mut *guard;
            let defaults = a.default_theme_preferences();
            let storage = LocalStorage::new(a.db.connection());
            a.theme_engine.reset(&storage, defaults).map_err(|e| e.to_string())?;
            Ok(theme_state(a))
        }

        // ─── Local data ───
        "local.clear" => {
            let mut a = lock(app)?;
            a.clear_local_data().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Admin session ───
        "admin.login" => {
            let username = str_param(params, "username")?.to_string();
            let password = Zeroizing::new(str_param(params, "password")?.to_string());
            let client = lock(app)?.backend.clone();
            let session = admin_auth::login(&client, &username, password, now_secs())
                .await
                .map_err(|e| e.to_string())?;
            let a = lock(app)?;
            a.sessions().save(&session).map_err(|e| e.to_string())?;
            Ok(json!({"username": session.username, "expires_at": session.expires_at}))
        }
        "admin.logout" => {
            let a = lock(app)?;
            a.sessions().logout().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "admin.status" => {
            let a = lock(app)?;
            let session = a.sessions().current(now_secs()).map_err(|e| e.to_string())?;
            Ok(match session {
                Some(s) => json!({"signed_in": true, "username": s.username, "expires_at": s.expires_at}),
                None => json!({"signed_in": false}),
            })
        }

        // ─── Admin: articles ───
        "admin.article.list" => {
            let console = admin_console(app)?;
            let page = usize_param(params, "page").unwrap_or(1);
            let per_page = match usize_param(params, "per_page") {
                Some(n) => n,
                None => lock(app)?.config.page_size,
            };
            let articles = console.list_all().await.map_err(|e| e.to_string())?;
            Ok(json!(paginate(articles, page, per_page)))
        }
        "admin.article.get" => {
            let id = str_param(params, "id")?;
            let console = admin_console(app)?;
            let article = console.get(id).await.map_err(|e| e.to_string())?;
            Ok(json!(article))
        }
        "admin.article.create" => {
            let draft: ArticleDraft = from_params(params)?;
            let console = admin_console(app)?;
            let article = console.create(&draft).await.map_err(|e| e.to_string())?;
            Ok(json!(article))
        }
        "admin.article.update" => {
            let id = str_param(params, "id")?;
            let draft: ArticleDraft = optional_param(params, "draft")?.ok_or("missing draft")?;
            let console = admin_console(app)?;
            let article = console.update(id, &draft).await.map_err(|e| e.to_string())?;
            Ok(json!(article))
        }
        "admin.article.set_status" => {
            let id = str_param(params, "id")?;
            let status: ArticleStatus = optional_param(params, "status")?.ok_or("missing status")?;
            let console = admin_console(app)?;
            let article = console.set_status(id, status).await.map_err(|e| e.to_string())?;
            Ok(json!(article))
        }
        "admin.article.delete" => {
            let id = str_param(params, "id")?;
            let console = admin_console(app)?;
            console.delete(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Admin: moderation ───
        "admin.comment.list" => {
            let status: Option<CommentStatus> = optional_param(params, "status")?;
            let service = CommentService::new(admin_console(app)?.client().clone());
            let comments = service.list_all(status).await.map_err(|e| e.to_string())?;
            Ok(json!(comments))
        }
        "admin.comment.approve" => {
            let id = str_param(params, "id")?;
            let service = CommentService::new(admin_console(app)?.client().clone());
            let comment = service.approve(id).await.map_err(|e| e.to_string())?;
            Ok(json!(comment))
        }
        "admin.comment.reject" => {
            let id = str_param(params, "id")?;
            let service = CommentService::new(admin_console(app)?.client().clone());
            let comment = service.reject(id).await.map_err(|e| e.to_string())?;
            Ok(json!(comment))
        }
        "admin.comment.delete" => {
            let id = str_param(params, "id")?;
            let service = CommentService::new(admin_console(app)?.client().clone());
            service.delete(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "admin.comment.pending_count" => {
            let service = CommentService::new(admin_console(app)?.client().clone());
            let count = service.pending_count().await.map_err(|e| e.to_string())?;
            Ok(json!({"count": count}))
        }

        // ─── Admin: contact messages ───
        "admin.contact.list" => {
            let service = ContactService::new(admin_console(app)?.client().clone());
            let messages = service.list().await.map_err(|e| e.to_string())?;
            Ok(json!(messages))
        }
        "admin.contact.mark_read" => {
            let id = str_param(params, "id")?;
            let service = ContactService::new(admin_console(app)?.client().clone());
            service.mark_read(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "admin.contact.delete" => {
            let id = str_param(params, "id")?;
            let service = ContactService::new(admin_console(app)?.client().clone());
            service.delete(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Admin: settings & analytics ───
        "admin.settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let (mut engine, client) = {
                let a = lock(app)?;
                let client = a.admin_client(now_secs()).map_err(|e| e.to_string())?;
                (a.settings_engine.clone(), client)
            };
            engine.set_value(key, value).map_err(|e| e.to_string())?;
            engine.save(&client).await.map_err(|e| e.to_string())?;
            let mut a = lock(app)?;
            a.settings_engine = engine;
            Ok(json!(a.settings_engine.get_settings()))
        }
        "admin.settings.reset" => {
            let (mut engine, client) = {
                let a = lock(app)?;
                let client = a.admin_client(now_secs()).map_err(|e| e.to_string())?;
                (a.settings_engine.clone(), client)
            };
            engine.reset();
            engine.save(&client).await.map_err(|e| e.to_string())?;
            let mut a = lock(app)?;
            a.settings_engine = engine;
            Ok(json!(a.settings_engine.get_settings()))
        }
        "admin.analytics" => {
            let days = params
                .get("days")
                .and_then(|v| v.as_u64())
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_ANALYTICS_DAYS);
            let top = usize_param(params, "top").unwrap_or(DEFAULT_TOP_ARTICLES);
            let client = lock(app)?.admin_client(now_secs()).map_err(|e| e.to_string())?;
            let report = AnalyticsService::new(client)
                .report(days, top)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!(report))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
