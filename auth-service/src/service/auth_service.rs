//! # Authentication Service
//!
//! Core business logic for the credential lifecycle:
//! - User registration and login
//! - Token pair issuance and rotation
//! - Logout (subject-wide revocation)
//! - Admin checks and user management
//! - Expired-credential eviction
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Token Architecture                            │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  ┌─────────────────┐                  ┌─────────────────────────┐   │
//! │  │  Access Token   │                  │    Refresh Token        │   │
//! │  │  (JWT, 15 min)  │                  │    (JWT, 30 days)       │   │
//! │  └────────┬────────┘                  └───────────┬─────────────┘   │
//! │           │                                       │                 │
//! │           ▼                                       ▼                 │
//! │  ┌─────────────────┐                  ┌─────────────────────────┐   │
//! │  │ Stateless       │                  │ Stateful (revocable)    │   │
//! │  │ verification    │                  │ via refresh_tokens row  │   │
//! │  └─────────────────┘                  └─────────────────────────┘   │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rotation invariant: after a successful refresh the old credential is
//! revoked before the new pair leaves this module, so a replay of the old
//! refresh token always fails.
//!
//! ## Error Handling
//!
//! | Scenario               | Error                 | HTTP Status |
//! |------------------------|-----------------------|-------------|
//! | Out-of-range input     | `Validation`          | 400         |
//! | Unknown username       | `UserNotFound`        | 404         |
//! | Name collision         | `DuplicateUsername`   | 409         |
//! | Wrong password         | `InvalidCredentials`  | 401         |
//! | Credential past expiry | `TokenExpired`        | 401         |
//! | Anything else token    | `TokenInvalid`        | 401         |

use chrono::Utc;
use shared::{
    auth::{jwt::Claims, JwtService, PasswordHasher, TokenPair},
    errors::ApiError,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    domain::{NewRefreshToken, NewUser, UserProfile},
    repository::{RefreshStore, UserStore},
};

// Validation bounds for registration input.
const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 50;
const PASSWORD_MIN_CHARS: usize = 4;

// =============================================================================
// SERVICE STRUCT
// =============================================================================

/// Authentication service with business logic for the credential lifecycle.
///
/// # Thread Safety
///
/// `AuthService` is `Send + Sync` and can be safely shared across
/// Actix-web workers: the stores are `Arc`-wrapped trait objects backed by
/// `PgPool`, and the token codec and password hasher are immutable after
/// construction.
#[derive(Clone)]
pub struct AuthService {
    /// User persistence
    users: Arc<dyn UserStore>,
    /// Refresh credential persistence
    tokens: Arc<dyn RefreshStore>,
    /// Token codec for issuing/validating pairs
    jwt: Arc<JwtService>,
    /// Password hasher (Argon2id)
    hasher: Arc<PasswordHasher>,
}

/// Response returned after a successful login.
///
/// Contains the token pair and a safe user projection.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    /// Access and refresh tokens
    pub tokens: TokenPair,
    /// User profile (no password hash)
    pub user: UserProfile,
}

impl AuthService {
    /// Creates a new authentication service instance.
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshStore>,
        jwt: Arc<JwtService>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self { users, tokens, jwt, hasher }
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Registers a new user account and issues its first token pair.
    ///
    /// # Process
    ///
    /// 1. Validate username/password bounds
    /// 2. Reject duplicate display names
    /// 3. Hash password with Argon2id
    /// 4. Create user (`is_admin = false`)
    /// 5. Mint a token pair and persist the refresh credential
    ///
    /// If step 5 fails the user row stays - the next login mints a fresh
    /// pair, so no cleanup is needed here.
    pub async fn register(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        info!(username = %username, "Attempting registration");

        Self::validate_credentials(username, password)?;

        // Check the display name is free
        if self.users.find_by_username(username).await?.is_some() {
            warn!(username = %username, "Registration rejected, username taken");
            return Err(ApiError::DuplicateUsername);
        }

        // Hash password using Argon2id
        let password_hash = self.hasher.hash(password)?;

        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                password_hash,
                is_admin: false,
            })
            .await?;

        info!(user_id = user.id, username = %username, "User registered");

        let pair = self.jwt.generate_pair(user.id, &user.username, user.is_admin)?;
        self.persist_refresh(user.id, &pair).await?;

        Ok(pair)
    }

    // =========================================================================
    // LOGIN
    // =========================================================================

    /// Authenticates a user with username and password.
    ///
    /// # Security
    ///
    /// Password verification is constant-time. Unknown usernames surface as
    /// `UserNotFound` so clients can distinguish a typo from a bad password.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Validation {
                message: "Username and password must not be empty".to_string(),
            });
        }

        info!(username = %username, "Attempting login");

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let password_ok = self.hasher.verify(password, &user.password_hash)?;
        if !password_ok {
            warn!(user_id = user.id, username = %username, "Failed login attempt");
            return Err(ApiError::InvalidCredentials);
        }

        let pair = self.jwt.generate_pair(user.id, &user.username, user.is_admin)?;
        self.persist_refresh(user.id, &pair).await?;

        info!(user_id = user.id, username = %username, "Login successful");

        Ok(AuthResponse {
            tokens: pair,
            user: user.into(),
        })
    }

    // =========================================================================
    // TOKEN REFRESH
    // =========================================================================

    /// Exchanges a refresh token for a new pair.
    ///
    /// Implements **token rotation**: the old refresh credential is revoked
    /// and a new pair is issued. The old credential must be revoked before
    /// this returns; if revocation fails the freshly persisted record is
    /// rolled back and the error surfaces.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        if refresh_token.is_empty() {
            return Err(ApiError::Validation {
                message: "Refresh token must not be empty".to_string(),
            });
        }

        // Signature, expiry and type check; Expired/Invalid surface directly
        let claims = self.jwt.validate_refresh(refresh_token)?;

        // The stored record must still be live. A record that exists but is
        // revoked or past its expiry is never promoted back to valid.
        let record = self
            .tokens
            .find_by_token(refresh_token)
            .await?
            .ok_or(ApiError::TokenInvalid)?;

        if !record.is_valid(Utc::now()) {
            warn!(user_id = record.user_id, "Refresh with revoked or expired credential");
            return Err(ApiError::TokenInvalid);
        }

        // Mint the replacement pair from the verified claims
        let pair = self.jwt.generate_pair(claims.user_id, &claims.username, claims.is_admin)?;

        // Persist the new record, then revoke the old one. Both must hold
        // before the pair is returned.
        self.persist_refresh(claims.user_id, &pair).await?;

        if let Err(e) = self.tokens.revoke(refresh_token).await {
            // Roll the new record back so the failed rotation leaves no
            // second live credential behind; the sweeper catches leftovers.
            if let Err(rollback) = self.tokens.delete(&pair.refresh_token).await {
                warn!(user_id = claims.user_id, error = %rollback, "Rotation rollback failed");
            }
            return Err(e);
        }

        info!(user_id = claims.user_id, "Token pair rotated");

        Ok(pair)
    }

    // =========================================================================
    // LOGOUT
    // =========================================================================

    /// Terminates every session of the caller.
    ///
    /// Takes the access credential, resolves the subject, and revokes **all**
    /// refresh records owned by it. Idempotent: logging out twice succeeds,
    /// the second call just finds nothing left to revoke.
    pub async fn logout(&self, access_token: &str) -> Result<(), ApiError> {
        let claims = self.jwt.validate_access(access_token)?;

        let revoked = self.tokens.revoke_all_for_user(claims.user_id).await?;

        info!(user_id = claims.user_id, sessions_terminated = revoked, "User logged out");

        Ok(())
    }

    // =========================================================================
    // TOKEN VALIDATION
    // =========================================================================

    /// Validates an access credential and returns its claims.
    ///
    /// Called by the gateway middleware and the chat hub on every
    /// authenticated request.
    pub fn validate_token(&self, access_token: &str) -> Result<Claims, ApiError> {
        self.jwt.validate_access(access_token)
    }

    // =========================================================================
    // USER MANAGEMENT
    // =========================================================================

    /// Reads the admin flag of a user. Pure lookup, no token interaction.
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, ApiError> {
        self.users
            .is_admin(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }

    /// Renames a user.
    pub async fn update_username(&self, user_id: i64, new_name: &str) -> Result<(), ApiError> {
        Self::validate_username(new_name)?;

        if self.users.find_by_username(new_name).await?.is_some() {
            return Err(ApiError::DuplicateUsername);
        }

        self.users.update_username(user_id, new_name).await?;

        info!(user_id = user_id, new_name = %new_name, "Username updated");

        Ok(())
    }

    /// Deletes a user account.
    ///
    /// Every refresh credential of the user is revoked first, so no session
    /// survives the account.
    pub async fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.tokens.revoke_all_for_user(user_id).await?;
        self.users.delete(user_id).await?;

        info!(user_id = user_id, "User deleted");

        Ok(())
    }

    // =========================================================================
    // RETENTION
    // =========================================================================

    /// Deletes refresh records past their expiry.
    ///
    /// Called by the periodic sweeper. Idempotent: a second sweep with no
    /// intervening writes deletes nothing.
    pub async fn sweep_expired(&self) -> Result<u64, ApiError> {
        let deleted = self.tokens.delete_expired().await?;

        if deleted > 0 {
            info!(deleted = deleted, "Swept expired refresh tokens");
        }

        Ok(deleted)
    }

    // =========================================================================
    // HELPER METHODS
    // =========================================================================

    /// Persists the refresh half of a freshly minted pair.
    async fn persist_refresh(&self, user_id: i64, pair: &TokenPair) -> Result<(), ApiError> {
        self.tokens
            .create(NewRefreshToken {
                user_id,
                token: pair.refresh_token.clone(),
                expires_at: Utc::now() + self.jwt.refresh_ttl(),
            })
            .await?;

        Ok(())
    }

    /// Registration input bounds.
    fn validate_credentials(username: &str, password: &str) -> Result<(), ApiError> {
        Self::validate_username(username)?;

        if password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(ApiError::Validation {
                message: format!("Password must be at least {} characters", PASSWORD_MIN_CHARS),
            });
        }

        Ok(())
    }

    fn validate_username(username: &str) -> Result<(), ApiError> {
        let len = username.chars().count();
        if len < USERNAME_MIN_CHARS || len > USERNAME_MAX_CHARS {
            return Err(ApiError::Validation {
                message: format!(
                    "Username must be {}-{} characters",
                    USERNAME_MIN_CHARS, USERNAME_MAX_CHARS
                ),
            });
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RefreshTokenRecord, User};
    use crate::repository::{MockRefreshStore, MockUserStore};
    use async_trait::async_trait;
    use chrono::Duration;
    use shared::config::AuthConfig;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Mutex;

    // -------------------------------------------------------------------------
    // In-memory stores
    // -------------------------------------------------------------------------
    // The rotation and logout scenarios are stateful, so expectation-style
    // mocks get unwieldy; these minimal in-memory stores model the real
    // tables instead. Failure injection flags cover the unhappy paths.

    #[derive(Default)]
    struct MemUserStore {
        users: Mutex<Vec<User>>,
        next_id: AtomicI64,
    }

    #[async_trait]
    impl UserStore for MemUserStore {
        async fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.username == new_user.username) {
                return Err(ApiError::DuplicateUsername);
            }
            let user = User {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                username: new_user.username,
                password_hash: new_user.password_hash,
                is_admin: new_user.is_admin,
                created_at: Utc::now(),
                updated_at: None,
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn update_username(&self, id: i64, new_name: &str) -> Result<(), ApiError> {
            let mut users = self.users.lock().unwrap();
            match users.iter_mut().find(|u| u.id == id) {
                Some(user) => {
                    user.username = new_name.to_string();
                    user.updated_at = Some(Utc::now());
                    Ok(())
                }
                None => Err(ApiError::UserNotFound),
            }
        }

        async fn delete(&self, id: i64) -> Result<(), ApiError> {
            let mut users = self.users.lock().unwrap();
            let before = users.len();
            users.retain(|u| u.id != id);
            if users.len() == before {
                return Err(ApiError::UserNotFound);
            }
            Ok(())
        }

        async fn is_admin(&self, id: i64) -> Result<Option<bool>, ApiError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .map(|u| u.is_admin))
        }
    }

    #[derive(Default)]
    struct MemRefreshStore {
        records: Mutex<Vec<RefreshTokenRecord>>,
        next_id: AtomicI64,
        fail_create: AtomicBool,
        fail_revoke: AtomicBool,
    }

    impl MemRefreshStore {
        fn live_tokens_for(&self, user_id: i64) -> usize {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id && r.is_valid(Utc::now()))
                .count()
        }

        fn insert_raw(&self, record: RefreshTokenRecord) {
            self.records.lock().unwrap().push(record);
        }

        fn contains_token(&self, token: &str) -> bool {
            self.records.lock().unwrap().iter().any(|r| r.token == token)
        }
    }

    #[async_trait]
    impl RefreshStore for MemRefreshStore {
        async fn create(&self, record: NewRefreshToken) -> Result<RefreshTokenRecord, ApiError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(ApiError::Internal { message: "insert failed".to_string() });
            }
            let stored = RefreshTokenRecord {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                user_id: record.user_id,
                token: record.token,
                expires_at: record.expires_at,
                created_at: Utc::now(),
                revoked: false,
            };
            self.records.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, ApiError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.token == token)
                .cloned())
        }

        async fn revoke(&self, token: &str) -> Result<(), ApiError> {
            if self.fail_revoke.load(Ordering::SeqCst) {
                return Err(ApiError::Internal { message: "revoke failed".to_string() });
            }
            if let Some(r) = self.records.lock().unwrap().iter_mut().find(|r| r.token == token) {
                r.revoked = true;
            }
            Ok(())
        }

        async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, ApiError> {
            let mut count = 0;
            for r in self.records.lock().unwrap().iter_mut() {
                if r.user_id == user_id && !r.revoked {
                    r.revoked = true;
                    count += 1;
                }
            }
            Ok(count)
        }

        async fn delete(&self, token: &str) -> Result<(), ApiError> {
            self.records.lock().unwrap().retain(|r| r.token != token);
            Ok(())
        }

        async fn delete_expired(&self) -> Result<u64, ApiError> {
            let now = Utc::now();
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|r| r.expires_at >= now);
            Ok((before - records.len()) as u64)
        }
    }

    // -------------------------------------------------------------------------
    // Fixtures
    // -------------------------------------------------------------------------

    fn jwt_service() -> Arc<JwtService> {
        Arc::new(JwtService::new(&AuthConfig {
            jwt_secret: "test_secret_key_minimum_32_chars_required".to_string(),
            access_token_ttl_seconds: 900,
            refresh_token_ttl_seconds: 2_592_000,
            sweep_interval_seconds: 3600,
        }))
    }

    fn fast_hasher() -> Arc<PasswordHasher> {
        // Light Argon2 parameters keep the suite fast
        Arc::new(PasswordHasher::with_params(8 * 1024, 1, 1))
    }

    fn service() -> (AuthService, Arc<MemUserStore>, Arc<MemRefreshStore>) {
        let users = Arc::new(MemUserStore::default());
        let tokens = Arc::new(MemRefreshStore::default());
        let service = AuthService::new(users.clone(), tokens.clone(), jwt_service(), fast_hasher());
        (service, users, tokens)
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_register_issues_valid_pair() {
        let (service, _, tokens) = service();

        let pair = service.register("alice", "secret123").await.unwrap();

        // The freshly issued access credential validates and points at the
        // new user
        let claims = service.validate_token(&pair.access_token).unwrap();
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.username, "alice");
        assert!(!claims.is_admin);

        // The refresh half landed in the store, unrevoked
        assert_eq!(tokens.live_tokens_for(1), 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_name_rejected() {
        let (service, _, _) = service();

        service.register("alice", "secret123").await.unwrap();
        let result = service.register("alice", "other456").await;

        assert!(matches!(result, Err(ApiError::DuplicateUsername)));
    }

    #[tokio::test]
    async fn test_register_username_boundaries() {
        let (service, _, _) = service();

        // 2 chars rejected, 3 accepted
        assert!(matches!(
            service.register("ab", "secret123").await,
            Err(ApiError::Validation { .. })
        ));
        assert!(service.register("abc", "secret123").await.is_ok());

        // 50 accepted, 51 rejected
        let fifty = "a".repeat(50);
        let fifty_one = "a".repeat(51);
        assert!(service.register(&fifty, "secret123").await.is_ok());
        assert!(matches!(
            service.register(&fifty_one, "secret123").await,
            Err(ApiError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_register_password_boundary() {
        let (service, _, _) = service();

        assert!(matches!(
            service.register("alice", "abc").await,
            Err(ApiError::Validation { .. })
        ));
        assert!(service.register("alice", "abcd").await.is_ok());
    }

    #[tokio::test]
    async fn test_register_survives_refresh_persist_failure() {
        let (service, users, tokens) = service();
        tokens.fail_create.store(true, Ordering::SeqCst);

        let result = service.register("alice", "secret123").await;
        assert!(result.is_err());

        // The user row stays; the next login recovers the session
        assert!(users.find_by_username("alice").await.unwrap().is_some());

        tokens.fail_create.store(false, Ordering::SeqCst);
        assert!(service.login("alice", "secret123").await.is_ok());
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_returns_pair_and_profile() {
        let (service, _, _) = service();
        service.register("alice", "secret123").await.unwrap();

        let response = service.login("alice", "secret123").await.unwrap();

        assert_eq!(response.user.id, 1);
        assert_eq!(response.user.username, "alice");
        assert!(!response.user.is_admin);

        let claims = service.validate_token(&response.tokens.access_token).unwrap();
        assert_eq!(claims.user_id, 1);
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (service, _, _) = service();

        let result = service.login("nobody", "secret123").await;
        assert!(matches!(result, Err(ApiError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (service, _, _) = service();
        service.register("alice", "secret123").await.unwrap();

        let result = service.login("alice", "wrong").await;
        assert!(matches!(result, Err(ApiError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_empty_inputs_rejected() {
        let (service, _, _) = service();

        assert!(matches!(
            service.login("", "secret123").await,
            Err(ApiError::Validation { .. })
        ));
        assert!(matches!(
            service.login("alice", "").await,
            Err(ApiError::Validation { .. })
        ));
    }

    // -------------------------------------------------------------------------
    // Refresh rotation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_refresh_rotates_and_rejects_replay() {
        let (service, _, _) = service();
        let pair = service.register("alice", "secret123").await.unwrap();

        // Exchange the pair
        let new_pair = service.refresh(&pair.refresh_token).await.unwrap();
        assert!(service.validate_token(&new_pair.access_token).is_ok());

        // Replaying the old refresh credential must fail
        let replay = service.refresh(&pair.refresh_token).await;
        assert!(matches!(replay, Err(ApiError::TokenInvalid)));

        // The rotated credential keeps working
        assert!(service.refresh(&new_pair.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_empty_rejected() {
        let (service, _, _) = service();

        let result = service.refresh("").await;
        assert!(matches!(result, Err(ApiError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_refresh_garbage_rejected() {
        let (service, _, _) = service();

        let result = service.refresh("not-a-token").await;
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_with_access_token_rejected() {
        let (service, _, _) = service();
        let pair = service.register("alice", "secret123").await.unwrap();

        // Wrong credential type
        let result = service.refresh(&pair.access_token).await;
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_unknown_record_rejected() {
        let (service, _, _) = service();
        service.register("alice", "secret123").await.unwrap();

        // A well-signed refresh token that was never persisted (e.g. minted
        // before a database restore)
        let orphan = jwt_service().generate_pair(1, "alice", false).unwrap();

        let result = service.refresh(&orphan.refresh_token).await;
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_revoked_record_rejected() {
        let (service, _, tokens) = service();
        let pair = service.register("alice", "secret123").await.unwrap();

        tokens.revoke(&pair.refresh_token).await.unwrap();

        // Verified claims but a revoked row: never re-issued
        let result = service.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_expired_record_rejected() {
        let (service, _, tokens) = service();
        service.register("alice", "secret123").await.unwrap();

        // JWT still valid, but the stored record's expiry already passed
        let pair = jwt_service().generate_pair(1, "alice", false).unwrap();
        tokens.insert_raw(RefreshTokenRecord {
            id: 99,
            user_id: 1,
            token: pair.refresh_token.clone(),
            expires_at: Utc::now() - Duration::seconds(10),
            created_at: Utc::now() - Duration::days(31),
            revoked: false,
        });

        let result = service.refresh(&pair.refresh_token).await;
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    #[tokio::test]
    async fn test_refresh_rolls_back_on_failed_revoke() {
        let (service, _, tokens) = service();
        let pair = service.register("alice", "secret123").await.unwrap();

        tokens.fail_revoke.store(true, Ordering::SeqCst);
        let result = service.refresh(&pair.refresh_token).await;
        assert!(result.is_err());

        // The half-created replacement record was deleted again: the only
        // live credential is still the original one
        assert_eq!(tokens.live_tokens_for(1), 1);
        assert!(tokens.contains_token(&pair.refresh_token));
    }

    // -------------------------------------------------------------------------
    // Logout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_logout_revokes_all_sessions() {
        let (service, _, _) = service();
        service.register("alice", "secret123").await.unwrap();

        let s1 = service.login("alice", "secret123").await.unwrap();
        let s2 = service.login("alice", "secret123").await.unwrap();

        service.logout(&s1.tokens.access_token).await.unwrap();

        // Every previously issued refresh credential is dead
        assert!(matches!(
            service.refresh(&s1.tokens.refresh_token).await,
            Err(ApiError::TokenInvalid)
        ));
        assert!(matches!(
            service.refresh(&s2.tokens.refresh_token).await,
            Err(ApiError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (service, _, _) = service();
        let pair = service.register("alice", "secret123").await.unwrap();

        service.logout(&pair.access_token).await.unwrap();
        // Second call finds nothing to revoke and still succeeds
        service.logout(&pair.access_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_requires_access_token() {
        let (service, _, _) = service();
        let pair = service.register("alice", "secret123").await.unwrap();

        let result = service.logout(&pair.refresh_token).await;
        assert!(matches!(result, Err(ApiError::TokenInvalid)));
    }

    // -------------------------------------------------------------------------
    // Admin / user management
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_is_admin_reads_flag() {
        let (service, users, _) = service();
        service.register("alice", "secret123").await.unwrap();

        assert!(!service.is_admin(1).await.unwrap());

        users.users.lock().unwrap()[0].is_admin = true;
        assert!(service.is_admin(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_is_admin_unknown_user() {
        let (service, _, _) = service();

        let result = service.is_admin(42).await;
        assert!(matches!(result, Err(ApiError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_update_username_checks_bounds_and_collisions() {
        let (service, _, _) = service();
        service.register("alice", "secret123").await.unwrap();
        service.register("bob", "secret123").await.unwrap();

        assert!(matches!(
            service.update_username(1, "ab").await,
            Err(ApiError::Validation { .. })
        ));
        assert!(matches!(
            service.update_username(1, "bob").await,
            Err(ApiError::DuplicateUsername)
        ));

        service.update_username(1, "alice2").await.unwrap();
        assert!(service.login("alice2", "secret123").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_revokes_sessions_first() {
        let (service, users, _) = service();
        let pair = service.register("alice", "secret123").await.unwrap();

        service.delete_user(1).await.unwrap();

        assert!(users.find_by_id(1).await.unwrap().is_none());
        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(ApiError::TokenInvalid)
        ));
    }

    // -------------------------------------------------------------------------
    // Retention
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sweep_expired_is_idempotent() {
        let (service, _, tokens) = service();
        service.register("alice", "secret123").await.unwrap();

        tokens.insert_raw(RefreshTokenRecord {
            id: 98,
            user_id: 1,
            token: "stale".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
            created_at: Utc::now() - Duration::days(31),
            revoked: false,
        });

        // First sweep removes the stale record, the live one stays
        assert_eq!(service.sweep_expired().await.unwrap(), 1);
        assert_eq!(tokens.live_tokens_for(1), 1);

        // Second sweep with no intervening writes is a no-op
        assert_eq!(service.sweep_expired().await.unwrap(), 0);
    }

    // -------------------------------------------------------------------------
    // Storage error propagation (mock-based)
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_is_admin_propagates_storage_errors() {
        let mut users = MockUserStore::new();
        users
            .expect_is_admin()
            .returning(|_| Err(ApiError::Internal { message: "db down".to_string() }));

        let service = AuthService::new(
            Arc::new(users),
            Arc::new(MockRefreshStore::new()),
            jwt_service(),
            fast_hasher(),
        );

        let result = service.is_admin(1).await;
        assert!(matches!(result, Err(ApiError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_sweep_delegates_to_store() {
        let mut tokens = MockRefreshStore::new();
        tokens.expect_delete_expired().times(1).returning(|| Ok(3));

        let service = AuthService::new(
            Arc::new(MockUserStore::new()),
            Arc::new(tokens),
            jwt_service(),
            fast_hasher(),
        );

        assert_eq!(service.sweep_expired().await.unwrap(), 3);
    }
}
