//! Mock local authentication.
//!
//! A stand-in for a backend that does not exist yet: user records live in a
//! list under one store key, passwords are compared in plaintext, and email
//! "sending" is a log line. Deliberately separate from the progression
//! engine; logging out leaves the game profile untouched.

use crate::store::{keys, KvStore};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user record in the mock database
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MockUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// The authenticated-user record exposed to screens (never carries the
/// password)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_guest: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Sign-up awaiting email verification
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingVerification {
    pub email: String,
    pub user_id: String,
}

/// Auth state as loaded at startup
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub pending_verification: Option<PendingVerification>,
}

/// Mock auth service over the key-value store
pub struct AuthService<S: KvStore> {
    store: S,
}

impl<S: KvStore> AuthService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the persisted auth state; read failures degrade to signed-out
    pub fn state(&self) -> AuthState {
        AuthState {
            user: self.read_json(keys::AUTH_USER),
            pending_verification: self.read_json(keys::PENDING_VERIFICATION),
        }
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.read_json(keys::AUTH_USER)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Stored value for '{}' is corrupt: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read '{}': {}", key, e);
                None
            }
        }
    }

    fn mock_users(&self) -> Vec<MockUser> {
        self.read_json(keys::MOCK_USERS).unwrap_or_default()
    }

    fn save_mock_users(&self, users: &[MockUser]) -> Result<()> {
        self.store
            .set(keys::MOCK_USERS, &serde_json::to_string(users)?)
    }

    /// True when no registered user holds the name (case-insensitive);
    /// conservatively false when the store cannot be read
    pub fn is_username_available(&self, username: &str) -> bool {
        !self
            .mock_users()
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username))
    }

    pub fn is_email_available(&self, email: &str) -> bool {
        !self
            .mock_users()
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// Register a new user and leave them pending email verification
    pub fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<PendingVerification> {
        let mut users = self.mock_users();

        if users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            return Err(Error::Auth("Username already taken".into()));
        }
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(Error::Auth("Email already registered".into()));
        }

        let user = MockUser {
            id: format!("user_{}", Uuid::new_v4().simple()),
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            is_verified: false,
            created_at: Utc::now(),
        };

        let pending = PendingVerification {
            email: user.email.clone(),
            user_id: user.id.clone(),
        };

        users.push(user);
        self.save_mock_users(&users)?;
        self.store
            .set(keys::PENDING_VERIFICATION, &serde_json::to_string(&pending)?)?;

        tracing::info!("Verification code sent to: {}", pending.email);
        Ok(pending)
    }

    /// Confirm the pending sign-up. Any 6-character code passes; there is no
    /// real email behind this.
    pub fn verify_email(&self, code: &str) -> Result<AuthUser> {
        let pending: PendingVerification = self
            .read_json(keys::PENDING_VERIFICATION)
            .ok_or_else(|| Error::Auth("No pending verification found".into()))?;

        if code.len() != 6 {
            return Err(Error::Auth("Invalid verification code".into()));
        }

        let mut users = self.mock_users();
        let user = users
            .iter_mut()
            .find(|u| u.id == pending.user_id)
            .ok_or_else(|| Error::Auth("User not found".into()))?;
        user.is_verified = true;

        let auth_user = AuthUser {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            is_guest: false,
            is_verified: true,
            created_at: user.created_at,
        };

        self.save_mock_users(&users)?;
        self.store
            .set(keys::AUTH_USER, &serde_json::to_string(&auth_user)?)?;
        self.store.remove(keys::PENDING_VERIFICATION)?;

        tracing::info!("Email verified for {}", auth_user.username);
        Ok(auth_user)
    }

    /// Re-log the fake verification mail for the pending sign-up
    pub fn resend_verification_code(&self) -> Result<()> {
        let pending: PendingVerification = self
            .read_json(keys::PENDING_VERIFICATION)
            .ok_or_else(|| Error::Auth("No pending verification found".into()))?;
        tracing::info!("Verification code sent to: {}", pending.email);
        Ok(())
    }

    /// Log in by username or email. Unverified users are pushed back into
    /// the verification flow.
    pub fn login(
        &self,
        email_or_username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<AuthUser> {
        let users = self.mock_users();
        let user = users
            .iter()
            .find(|u| {
                (u.email.eq_ignore_ascii_case(email_or_username)
                    || u.username.eq_ignore_ascii_case(email_or_username))
                    && u.password == password
            })
            .ok_or_else(|| Error::Auth("Invalid credentials".into()))?;

        if !user.is_verified {
            let pending = PendingVerification {
                email: user.email.clone(),
                user_id: user.id.clone(),
            };
            self.store
                .set(keys::PENDING_VERIFICATION, &serde_json::to_string(&pending)?)?;
            return Err(Error::Auth("Please verify your email first".into()));
        }

        let auth_user = AuthUser {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            is_guest: false,
            is_verified: true,
            created_at: user.created_at,
        };

        self.store
            .set(keys::AUTH_USER, &serde_json::to_string(&auth_user)?)?;
        if remember_me {
            self.store.set(keys::REMEMBER_ME, "true")?;
        }

        tracing::info!("Logged in as {}", auth_user.username);
        Ok(auth_user)
    }

    /// Create an ephemeral guest identity, no registration required
    pub fn login_as_guest(&self) -> Result<AuthUser> {
        let suffix = Uuid::new_v4().as_u128() % 10000;
        let guest = AuthUser {
            id: format!("guest_{}", Uuid::new_v4().simple()),
            username: format!("Guest{}", suffix),
            email: String::new(),
            is_guest: true,
            is_verified: false,
            created_at: Utc::now(),
        };

        self.store
            .set(keys::AUTH_USER, &serde_json::to_string(&guest)?)?;

        tracing::info!("Logged in as guest {}", guest.username);
        Ok(guest)
    }

    /// Pretend to send a password-reset email to a registered address
    pub fn request_password_reset(&self, email: &str) -> Result<()> {
        let users = self.mock_users();
        if !users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(Error::Auth("Email not found".into()));
        }

        tracing::info!("Password reset email sent to: {}", email);
        Ok(())
    }

    /// Sign out. The game profile is device-global and stays put.
    pub fn logout(&self) -> Result<()> {
        self.store.remove(keys::AUTH_USER)?;
        self.store.remove(keys::REMEMBER_ME)?;
        tracing::info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;
    use tempfile::TempDir;

    fn service_in(dir: &TempDir) -> AuthService<FileStore> {
        AuthService::new(FileStore::open(dir.path()).unwrap())
    }

    #[test]
    fn test_sign_up_leaves_user_pending() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service_in(&dir);

        let pending = auth.sign_up("alex", "alex@example.com", "hunter2").unwrap();
        assert_eq!(pending.email, "alex@example.com");

        let state = auth.state();
        assert!(state.user.is_none());
        assert_eq!(state.pending_verification, Some(pending));
    }

    #[test]
    fn test_sign_up_rejects_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service_in(&dir);

        auth.sign_up("alex", "alex@example.com", "pw").unwrap();

        assert!(auth.sign_up("ALEX", "other@example.com", "pw").is_err());
        assert!(auth.sign_up("other", "Alex@Example.com", "pw").is_err());
        assert!(!auth.is_username_available("alex"));
        assert!(auth.is_username_available("casey"));
    }

    #[test]
    fn test_login_requires_verification() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service_in(&dir);

        auth.sign_up("alex", "alex@example.com", "hunter2").unwrap();

        let err = auth.login("alex", "hunter2", false).unwrap_err();
        assert!(err.to_string().contains("verify"));
    }

    #[test]
    fn test_verify_then_login() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service_in(&dir);

        auth.sign_up("alex", "alex@example.com", "hunter2").unwrap();

        // Wrong-length code is rejected
        assert!(auth.verify_email("123").is_err());

        let user = auth.verify_email("123456").unwrap();
        assert!(user.is_verified);
        assert!(!user.is_guest);
        assert!(auth.state().pending_verification.is_none());

        auth.logout().unwrap();
        let user = auth.login("alex@example.com", "hunter2", true).unwrap();
        assert_eq!(user.username, "alex");
        assert_eq!(auth.current_user(), Some(user));
    }

    #[test]
    fn test_login_rejects_bad_password() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service_in(&dir);

        auth.sign_up("alex", "alex@example.com", "hunter2").unwrap();
        auth.verify_email("000000").unwrap();

        assert!(auth.login("alex", "wrong", false).is_err());
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_guest_login() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service_in(&dir);

        let guest = auth.login_as_guest().unwrap();
        assert!(guest.is_guest);
        assert!(guest.username.starts_with("Guest"));
        assert_eq!(auth.current_user(), Some(guest));
    }

    #[test]
    fn test_logout_clears_session_keys() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service_in(&dir);

        auth.login_as_guest().unwrap();
        auth.logout().unwrap();

        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_password_reset_requires_known_email() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service_in(&dir);

        assert!(auth.request_password_reset("nobody@example.com").is_err());

        auth.sign_up("alex", "alex@example.com", "pw").unwrap();
        assert!(auth.request_password_reset("alex@example.com").is_ok());
    }
}
