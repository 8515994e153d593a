//! Current-user profile operations

pub mod service;

pub use service::{EditUserRequest, UserService};
