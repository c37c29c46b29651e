//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessTokenClaims, LoginRequest, RegisterRequest, Session, SessionTokens},
};
use crate::error::is_unique_violation;
use crate::player::{Player, PlayerId, manager::PLAYER_COLUMNS};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Credentials row read during login
#[derive(sqlx::FromRow)]
struct Credentials {
    id: PlayerId,
    password_hash: String,
    is_active: bool,
}

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    pool: Arc<PgPool>,
    pepper: String,
    jwt_secret: String,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(pool: Arc<PgPool>, pepper: String, jwt_secret: String) -> Self {
        Self {
            pool,
            pepper,
            jwt_secret,
            access_token_duration: Duration::days(7),
            refresh_token_duration: Duration::days(30),
        }
    }

    /// Override the access and refresh token lifetimes
    pub fn with_token_durations(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_token_duration = access;
        self.refresh_token_duration = refresh;
        self
    }

    /// Access token lifetime
    pub fn access_token_duration(&self) -> Duration {
        self.access_token_duration
    }

    /// Register a new player
    ///
    /// # Errors
    ///
    /// * `AuthError::EmailTaken` - Email already exists
    /// * `AuthError::InvalidEmail` - Email format invalid
    /// * `AuthError::InvalidProfile` - First or last name missing
    /// * `AuthError::WeakPassword` - Password too weak
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<Player> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(AuthError::InvalidProfile(
                "First and last name are required".to_string(),
            ));
        }

        let existing = sqlx::query_scalar::<_, PlayerId>("SELECT id FROM players WHERE email = $1")
            .bind(&email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hash_password(&request.password)?;

        let query = format!(
            r#"
            INSERT INTO players (email, password_hash, first_name, last_name, display_name,
                                 phone, date_of_birth, skill_level, preferred_hand)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PLAYER_COLUMNS}
            "#
        );

        let player = sqlx::query_as::<_, Player>(&query)
            .bind(&email)
            .bind(&password_hash)
            .bind(request.first_name.trim())
            .bind(request.last_name.trim())
            .bind(&request.display_name)
            .bind(&request.phone)
            .bind(request.date_of_birth)
            .bind(request.skill_level)
            .bind(request.preferred_hand)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::EmailTaken
                } else {
                    AuthError::Database(e)
                }
            })?;

        log::info!("Registered player {} ({})", player.id, player.email);
        Ok(player)
    }

    /// Login a player
    ///
    /// # Arguments
    ///
    /// * `request` - Login request with email and password
    /// * `device_fingerprint` - Device fingerprint (User-Agent + client address)
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown email or incorrect password
    /// * `AuthError::InactivePlayer` - Account deactivated
    pub async fn login(
        &self,
        request: LoginRequest,
        device_fingerprint: String,
    ) -> AuthResult<(Player, SessionTokens)> {
        let email = normalize_email(&request.email);

        let credentials = sqlx::query_as::<_, Credentials>(
            "SELECT id, password_hash, is_active FROM players WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        self.verify_password(&request.password, &credentials.password_hash)?;

        if !credentials.is_active {
            return Err(AuthError::InactivePlayer);
        }

        let player = self.fetch_player(credentials.id).await?;
        let tokens = self
            .create_session(player.id, &player.email, device_fingerprint)
            .await?;

        Ok((player, tokens))
    }

    /// Create a new session with access and refresh tokens
    async fn create_session(
        &self,
        player_id: PlayerId,
        email: &str,
        device_fingerprint: String,
    ) -> AuthResult<SessionTokens> {
        let access_token = self.generate_access_token(player_id, email)?;
        let refresh_token = Uuid::new_v4().to_string();

        let expires_at = Utc::now() + self.refresh_token_duration;
        sqlx::query(
            r#"
            INSERT INTO sessions (token, player_id, device_fingerprint, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&refresh_token)
        .bind(player_id)
        .bind(&device_fingerprint)
        .bind(expires_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
            expires_in: self.access_token_duration.num_seconds(),
        })
    }

    /// Refresh access token using refresh token
    ///
    /// The presented refresh token is consumed and a new pair is issued.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidRefreshToken` - Unknown token or fingerprint mismatch
    /// * `AuthError::SessionExpired` - Refresh token expired
    /// * `AuthError::InactivePlayer` - Account deactivated since login
    pub async fn refresh_token(
        &self,
        refresh_token: String,
        device_fingerprint: String,
    ) -> AuthResult<SessionTokens> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT token, player_id, device_fingerprint, created_at, expires_at, last_used
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(&refresh_token)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AuthError::InvalidRefreshToken)?;

        if session.is_expired(Utc::now()) {
            self.delete_session(&refresh_token).await?;
            return Err(AuthError::SessionExpired);
        }

        if session.device_fingerprint != device_fingerprint {
            return Err(AuthError::InvalidRefreshToken);
        }

        let player = self.fetch_player(session.player_id).await?;
        if !player.is_active {
            self.delete_session(&refresh_token).await?;
            return Err(AuthError::InactivePlayer);
        }

        self.delete_session(&refresh_token).await?;
        self.create_session(player.id, &player.email, device_fingerprint)
            .await
    }

    /// Logout by invalidating a refresh token
    pub async fn logout(&self, refresh_token: String) -> AuthResult<()> {
        self.delete_session(&refresh_token).await
    }

    /// Verify an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn delete_session(&self, refresh_token: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(refresh_token)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn fetch_player(&self, player_id: PlayerId) -> AuthResult<Player> {
        let query = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1");
        sqlx::query_as::<_, Player>(&query)
            .bind(player_id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(AuthError::PlayerNotFound)
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);

        Ok(Argon2::default()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Generate JWT access token
    fn generate_access_token(&self, player_id: PlayerId, email: &str) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: player_id,
            email: email.to_string(),
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?)
    }
}

/// Emails are stored trimmed and lowercased
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email format
fn validate_email(email: &str) -> AuthResult<()> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail("Missing @".to_string()));
    };

    if local.is_empty() || domain.contains('@') {
        return Err(AuthError::InvalidEmail("Malformed address".to_string()));
    }

    let valid_domain = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());
    if !valid_domain {
        return Err(AuthError::InvalidEmail("Malformed domain".to_string()));
    }

    if email.chars().any(char::is_whitespace) || email.len() > 255 {
        return Err(AuthError::InvalidEmail("Malformed address".to_string()));
    }

    Ok(())
}

/// Validate password strength
fn validate_password(password: &str) -> AuthResult<()> {
    if password.len() < 8 {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());

    if !has_digit || !has_uppercase || !has_lowercase {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one number, one uppercase and one lowercase letter"
                .to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_manager() -> AuthManager {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/tennis_tournament_test")
            .unwrap();
        AuthManager::new(
            Arc::new(pool),
            "test_pepper_value".to_string(),
            "test_jwt_secret_that_is_long_enough".to_string(),
        )
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Secure123").is_ok());
        assert!(matches!(
            validate_password("Sh0rt"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("player@club.example").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@club.com").is_err());
        assert!(validate_email("player@localhost").is_err());
        assert!(validate_email("player@club..com").is_err());
        assert!(validate_email("pl ayer@club.com").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Player@Club.COM "), "player@club.com");
    }

    #[tokio::test]
    async fn test_password_hash_roundtrip_uses_pepper() {
        let auth = lazy_manager();
        let hash = auth.hash_password("Secure123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(auth.verify_password("Secure123", &hash).is_ok());
        assert!(matches!(
            auth.verify_password("Secure124", &hash),
            Err(AuthError::InvalidCredentials)
        ));

        let other_pepper = AuthManager {
            pepper: "different_pepper".to_string(),
            ..auth.clone()
        };
        assert!(other_pepper.verify_password("Secure123", &hash).is_err());
    }

    #[tokio::test]
    async fn test_access_token_roundtrip() {
        let auth = lazy_manager();
        let token = auth.generate_access_token(42, "p@club.com").unwrap();

        let claims = auth.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "p@club.com");
        assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
    }

    #[tokio::test]
    async fn test_access_token_rejected_with_wrong_secret() {
        let auth = lazy_manager();
        let token = auth.generate_access_token(1, "p@club.com").unwrap();

        let other = AuthManager {
            jwt_secret: "another_secret_that_is_also_long".to_string(),
            ..auth
        };
        assert!(matches!(
            other.verify_access_token(&token),
            Err(AuthError::JwtError(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_access_token_rejected() {
        let auth = lazy_manager()
            .with_token_durations(Duration::minutes(-10), Duration::days(1));
        let token = auth.generate_access_token(1, "p@club.com").unwrap();

        assert!(auth.verify_access_token(&token).is_err());
    }

    #[tokio::test]
    async fn test_custom_token_durations() {
        let auth =
            lazy_manager().with_token_durations(Duration::minutes(15), Duration::days(7));
        assert_eq!(auth.access_token_duration(), Duration::minutes(15));
    }
}
