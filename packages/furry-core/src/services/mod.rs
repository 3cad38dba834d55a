//! Application services layer.
//!
//! Headless state holders for each screen. Each exposes its state through
//! `tokio::sync::watch` so any front end can observe changes.

pub mod find_service;
pub mod search_service;
pub mod settings_service;

pub use find_service::{FindService, FindState};
pub use search_service::{SearchService, SearchState, ZipState};
pub use settings_service::{ResolveHandle, SettingsService, SettingsState};
