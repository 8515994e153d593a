//! Owner-scoped bookmark operations

pub mod service;

pub use service::{BookmarkService, CreateBookmarkRequest, EditBookmarkRequest};
