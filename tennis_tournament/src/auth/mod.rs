//! Player sign-up, login and session management.
//!
//! - Argon2id password hashing with a server-side pepper
//! - HS256 JWT access tokens carrying the player id
//! - Rotating refresh tokens stored in the `sessions` table
//!
//! ## Example
//!
//! ```no_run
//! use tennis_tournament::auth::{AuthManager, RegisterRequest};
//! use tennis_tournament::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let auth = AuthManager::new(
//!         Arc::new(db.pool().clone()),
//!         "secret_pepper".to_string(),
//!         "jwt_secret".to_string(),
//!     );
//!
//!     let request = RegisterRequest {
//!         email: "rafa@example.com".to_string(),
//!         password: "SecurePass123".to_string(),
//!         first_name: "Rafa".to_string(),
//!         last_name: "Clay".to_string(),
//!         display_name: None,
//!         phone: None,
//!         date_of_birth: None,
//!         skill_level: Default::default(),
//!         preferred_hand: Default::default(),
//!     };
//!
//!     let player = auth.register(request).await?;
//!     println!("Registered player {}", player.id);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{AccessTokenClaims, LoginRequest, RegisterRequest, Session, SessionTokens};
