// Quillpost state managers
// Managers own device-local state: the reading list.

pub mod bookmark_manager;
