//! Authentication service.
//!
//! Account registration and password sign-in over a [`UserStore`].

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use lorebot_core::Email;

use crate::db::{RepositoryError, UserStore};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
///
/// Handles account registration and sign-in against the backing user store.
pub struct AuthService<S> {
    users: S,
}

impl<S: UserStore> AuthService<S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: S) -> Self {
        Self { users }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(&email, name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use lorebot_core::UserId;

    use super::*;

    /// In-memory user store mirroring the Postgres semantics.
    #[derive(Default)]
    struct InMemoryUserStore {
        users: Mutex<HashMap<String, (User, String)>>,
    }

    #[async_trait]
    impl UserStore for InMemoryUserStore {
        async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email.as_str()).map(|(u, _)| u.clone()))
        }

        async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
        }

        async fn create_with_password(
            &self,
            email: &Email,
            name: Option<&str>,
            password_hash: &str,
        ) -> Result<User, RepositoryError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email.as_str()) {
                return Err(RepositoryError::Conflict("email already exists".to_owned()));
            }

            let now = Utc::now();
            let user = User {
                id: UserId::new(i32::try_from(users.len()).unwrap() + 1),
                email: email.clone(),
                name: name.map(String::from),
                created_at: now,
                updated_at: now,
            };
            users.insert(
                email.as_str().to_owned(),
                (user.clone(), password_hash.to_owned()),
            );
            Ok(user)
        }

        async fn get_password_hash(
            &self,
            email: &Email,
        ) -> Result<Option<(User, String)>, RepositoryError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email.as_str()).cloned())
        }
    }

    fn service() -> AuthService<InMemoryUserStore> {
        AuthService::new(InMemoryUserStore::default())
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let auth = service();
        let user = auth.register("a@b.com", "abcdef", None).await.unwrap();
        assert_eq!(user.email.as_str(), "a@b.com");

        let (_, stored) = auth
            .users
            .get_password_hash(&Email::parse("a@b.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored, "abcdef");
        assert!(verify_password("abcdef", &stored).is_ok());
        assert!(verify_password("wrong", &stored).is_err());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let auth = service();
        auth.register("a@b.com", "abcdef", None).await.unwrap();

        let result = auth.register("a@b.com", "ghijkl", None).await;
        assert!(matches!(result, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let auth = service();
        let result = auth.register("a@b.com", "abc", None).await;
        assert!(matches!(result, Err(AuthError::WeakPassword(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let auth = service();
        let result = auth.register("not-an-email", "abcdef", None).await;
        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
    }

    #[tokio::test]
    async fn test_login_roundtrip() {
        let auth = service();
        let registered = auth
            .register("a@b.com", "abcdef", Some("Ada"))
            .await
            .unwrap();

        let user = auth.login("a@b.com", "abcdef").await.unwrap();
        assert_eq!(user.id, registered.id);
        assert_eq!(user.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let auth = service();
        auth.register("a@b.com", "abcdef", None).await.unwrap();

        let result = auth.login("a@b.com", "nope-wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let auth = service();
        let result = auth.login("missing@b.com", "abcdef").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("abcdef").unwrap();
        let b = hash_password("abcdef").unwrap();
        assert_ne!(a, b);
    }
}
