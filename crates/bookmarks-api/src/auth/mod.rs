//! Authentication module
//!
//! - Access token signing and verification
//! - Password hashing with Argon2id
//! - Middleware guarding the protected routes
//! - Signup and login service

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{Claims, TokenError, TokenIssuer};
pub use middleware::{auth_middleware, AuthError, AuthenticatedUser};
pub use password::{CredentialHasher, PasswordError};
pub use service::{AuthRequest, AuthResponse, AuthService};
