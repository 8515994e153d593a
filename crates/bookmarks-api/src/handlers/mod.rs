//! API handlers

pub mod auth;
pub mod bookmarks;
pub mod health;
pub mod users;
