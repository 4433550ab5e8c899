// Quillpost shared type definitions
// Each submodule defines types used across the client: backend rows, local records, errors.

pub mod admin;
pub mod analytics;
pub mod article;
pub mod bookmark;
pub mod comment;
pub mod contact;
pub mod errors;
pub mod settings;
