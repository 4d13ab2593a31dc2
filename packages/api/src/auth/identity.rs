//! # Identity service
//!
//! The [`IdentityService`] trait is the seam between the rating service and
//! whatever owns accounts and bearer tokens. Handlers only ever talk to the trait.
//!
//! [`LocalIdentity`] is the bundled implementation. It keeps its records in a
//! [`RecordStore`] under its own `auth:` namespace, separate from the
//! application's `user:` mirror:
//!
//! | Key | Value |
//! |-----|-------|
//! | `auth:account:<email>` | [`Credential`]: the account plus its Argon2id hash |
//! | `auth:session:<token>` | [`SessionRecord`] |
//!
//! Expired sessions are removed lazily, when a request presents them. Account
//! creation is serialised per identity service, so two signups for one email
//! cannot both pass the duplicate check.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use store::record::{get_json, set_json};
use store::{RecordStore, StoreError};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::password::{hash_password, verify_password, HashError};
use super::session::{generate_token, is_well_formed_token, SessionRecord, SignIn};
use crate::models::{normalize_email, Account};

/// Shortest password accepted for a new account.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest session lifetime, in days. Longer lifetimes are clamped to it.
pub const MAX_TOKEN_TTL_DAYS: i64 = 365 * 100;

const ACCOUNT_PREFIX: &str = "auth:account:";
const SESSION_PREFIX: &str = "auth:session:";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("an account with this email already exists")]
    DuplicateEmail,

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("password hashing failed: {0}")]
    Hash(HashError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<HashError> for IdentityError {
    fn from(e: HashError) -> Self {
        IdentityError::Hash(e)
    }
}

/// Issues and validates bearer tokens, and owns account records.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignIn, IdentityError>;

    /// Resolve a bearer token to its account.
    async fn verify_token(&self, token: &str) -> Result<Account, IdentityError>;

    /// Invalidate a token. Unknown tokens are ignored.
    async fn sign_out(&self, token: &str) -> Result<(), IdentityError>;
}

/// Stored credential: the account and its password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(flatten)]
    pub account: Account,
    pub password_hash: String,
}

/// Password accounts and opaque session tokens kept in a record store.
#[derive(Clone)]
pub struct LocalIdentity {
    store: Arc<dyn RecordStore>,
    token_ttl: Duration,
    /// Held from the duplicate check until the credential is written.
    signup: Arc<Mutex<()>>,
}

impl LocalIdentity {
    pub fn new(store: Arc<dyn RecordStore>, token_ttl: Duration) -> Self {
        Self {
            store,
            token_ttl: token_ttl.min(Duration::days(MAX_TOKEN_TTL_DAYS)),
            signup: Arc::new(Mutex::new(())),
        }
    }

    fn account_key(email: &str) -> String {
        format!("{ACCOUNT_PREFIX}{email}")
    }

    fn session_key(token: &str) -> String {
        format!("{SESSION_PREFIX}{token}")
    }

    async fn credential(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        get_json(self.store.as_ref(), &Self::account_key(email)).await
    }
}

#[async_trait]
impl IdentityService for LocalIdentity {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, IdentityError> {
        let email = normalize_email(email);

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::WeakPassword);
        }

        let _signup = self.signup.lock().await;
        if self.credential(&email).await?.is_some() {
            return Err(IdentityError::DuplicateEmail);
        }

        let credential = Credential {
            account: Account {
                id: Uuid::new_v4(),
                email: email.clone(),
                name: name.trim().to_string(),
                created_at: Utc::now(),
            },
            password_hash: hash_password(password)?,
        };
        set_json(self.store.as_ref(), &Self::account_key(&email), &credential).await?;

        tracing::info!(user_id = %credential.account.id, "account created");
        Ok(credential.account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignIn, IdentityError> {
        let email = normalize_email(email);

        let Some(credential) = self.credential(&email).await? else {
            return Err(IdentityError::InvalidCredentials);
        };
        if !verify_password(password, &credential.password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }

        let token = generate_token();
        let issued_at = Utc::now();
        let session = SessionRecord {
            user_id: credential.account.id,
            email,
            issued_at,
            expires_at: issued_at + self.token_ttl,
        };
        set_json(self.store.as_ref(), &Self::session_key(&token), &session).await?;

        Ok(SignIn {
            token,
            expires_at: session.expires_at,
            account: credential.account,
        })
    }

    async fn verify_token(&self, token: &str) -> Result<Account, IdentityError> {
        if !is_well_formed_token(token) {
            return Err(IdentityError::InvalidToken);
        }

        let key = Self::session_key(token);
        let Some(session) = get_json::<SessionRecord>(self.store.as_ref(), &key).await? else {
            return Err(IdentityError::InvalidToken);
        };

        if session.is_expired_at(Utc::now()) {
            self.store.delete(&key).await?;
            return Err(IdentityError::InvalidToken);
        }

        match self.credential(&session.email).await? {
            Some(credential) if credential.account.id == session.user_id => Ok(credential.account),
            _ => Err(IdentityError::InvalidToken),
        }
    }

    async fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        if !is_well_formed_token(token) {
            return Ok(());
        }
        self.store.delete(&Self::session_key(token)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    fn identity(ttl: Duration) -> (LocalIdentity, MemoryStore) {
        let store = MemoryStore::new();
        (LocalIdentity::new(Arc::new(store.clone()), ttl), store)
    }

    #[tokio::test]
    async fn test_create_sign_in_verify() {
        let (identity, _) = identity(Duration::hours(1));

        let account = identity
            .create_account(" Ann@Uni.EDU ", "hunter22", "Ann")
            .await
            .unwrap();
        assert_eq!(account.email, "ann@uni.edu");

        let signed_in = identity.sign_in("ann@uni.edu", "hunter22").await.unwrap();
        assert_eq!(signed_in.account, account);

        let verified = identity.verify_token(&signed_in.token).await.unwrap();
        assert_eq!(verified.id, account.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let (identity, _) = identity(Duration::hours(1));
        identity.create_account("a@b.c", "hunter22", "A").await.unwrap();

        let err = identity
            .create_account("A@B.C", "another1", "B")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_short_password_is_rejected() {
        let (identity, store) = identity(Duration::hours(1));
        let err = identity.create_account("a@b.c", "12345", "A").await.unwrap_err();
        assert!(matches!(err, IdentityError::WeakPassword));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_bad_credentials_look_the_same() {
        let (identity, _) = identity(Duration::hours(1));
        identity.create_account("a@b.c", "hunter22", "A").await.unwrap();

        let wrong_password = identity.sign_in("a@b.c", "hunter23").await.unwrap_err();
        let unknown_email = identity.sign_in("x@b.c", "hunter22").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, IdentityError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_and_removed() {
        let (identity, store) = identity(Duration::zero());
        identity.create_account("a@b.c", "hunter22", "A").await.unwrap();
        let signed_in = identity.sign_in("a@b.c", "hunter22").await.unwrap();

        let err = identity.verify_token(&signed_in.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidToken));
        assert!(store.scan_prefix(SESSION_PREFIX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_invalidates_token() {
        let (identity, _) = identity(Duration::hours(1));
        identity.create_account("a@b.c", "hunter22", "A").await.unwrap();
        let signed_in = identity.sign_in("a@b.c", "hunter22").await.unwrap();

        identity.sign_out(&signed_in.token).await.unwrap();
        assert!(matches!(
            identity.verify_token(&signed_in.token).await,
            Err(IdentityError::InvalidToken)
        ));

        // Signing out twice is harmless
        identity.sign_out(&signed_in.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (identity, _) = identity(Duration::hours(1));
        assert!(matches!(
            identity.verify_token("deadbeef").await,
            Err(IdentityError::InvalidToken)
        ));
        assert!(matches!(
            identity.verify_token(&generate_token()).await,
            Err(IdentityError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_oversized_token_on_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let identity = LocalIdentity::new(
            Arc::new(store::FileStore::new(dir.path())),
            Duration::hours(1),
        );

        for token in ["x".repeat(200), "ab".repeat(5000)] {
            assert!(matches!(
                identity.verify_token(&token).await,
                Err(IdentityError::InvalidToken)
            ));
            identity.sign_out(&token).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_long_email_on_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let identity = LocalIdentity::new(
            Arc::new(store::FileStore::new(dir.path())),
            Duration::hours(1),
        );
        let email = format!("{}@example.com", "a".repeat(120));

        let account = identity.create_account(&email, "hunter22", "Long").await.unwrap();
        let signed_in = identity.sign_in(&email, "hunter22").await.unwrap();
        assert_eq!(identity.verify_token(&signed_in.token).await.unwrap(), account);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signups_create_one_account() {
        let (identity, _) = identity(Duration::hours(1));

        let attempts: Vec<_> = (0..4)
            .map(|i| {
                let identity = identity.clone();
                tokio::spawn(async move {
                    identity
                        .create_account("a@b.c", "hunter22", &format!("User {i}"))
                        .await
                })
            })
            .collect();

        let mut created = Vec::new();
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(account) => created.push(account),
                Err(IdentityError::DuplicateEmail) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created.len(), 1);

        let signed_in = identity.sign_in("a@b.c", "hunter22").await.unwrap();
        assert_eq!(signed_in.account.id, created[0].id);
    }

    #[tokio::test]
    async fn test_huge_ttl_is_clamped() {
        // Far beyond the last representable date
        let (identity, _) = identity(Duration::days(365 * 280_000));
        identity.create_account("a@b.c", "hunter22", "A").await.unwrap();

        let signed_in = identity.sign_in("a@b.c", "hunter22").await.unwrap();
        let lifetime = signed_in.expires_at - Utc::now();
        assert!(lifetime <= Duration::days(MAX_TOKEN_TTL_DAYS));
        assert!(lifetime > Duration::days(MAX_TOKEN_TTL_DAYS - 1));
        assert!(identity.verify_token(&signed_in.token).await.is_ok());
    }
}
