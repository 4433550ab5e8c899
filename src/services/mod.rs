// Quillpost services
// Backend access, reader and admin workflows, formatting, listing, settings and themes.

pub mod admin_auth;
pub mod admin_console;
pub mod analytics;
pub mod article_service;
pub mod backend_client;
pub mod comment_service;
pub mod contact_service;
pub mod formatting;
pub mod listing;
pub mod settings_engine;
pub mod theme_engine;
pub mod visitor;
