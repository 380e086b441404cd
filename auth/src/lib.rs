//! Authentication utilities library
//!
//! Provides the credential and session-token machinery for the account service:
//! - Password hashing (Argon2id)
//! - JWT token generation and validation
//! - Token lifecycle (access, refresh, email verification, password reset)
//! - Token revocation
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{InMemoryRevocationList, TokenLifetimes, TokenService};
//!
//! let tokens = TokenService::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     TokenLifetimes::default(),
//!     Arc::new(InMemoryRevocationList::new()),
//! )
//! .unwrap();
//!
//! let access = tokens.issue_access_token("user123", "alice@example.com").unwrap();
//! let claims = tokens.verify_access_token(&access).unwrap();
//! assert_eq!(claims.sub.as_deref(), Some("user123"));
//!
//! tokens.revoke(&access).unwrap();
//! assert!(tokens.verify_access_token(&access).is_err());
//! ```

pub mod jwt;
pub mod password;
pub mod revocation;
pub mod tokens;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenKind;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use revocation::InMemoryRevocationList;
pub use revocation::RevocationList;
pub use tokens::TokenError;
pub use tokens::TokenLifetimes;
pub use tokens::TokenService;
