//! Session service
//!
//! Tracks the signed-in user and an opaque session token in the key-value
//! store, and owns the register/login flows. Passwords only ever touch
//! this module as arguments into the hashing boundary; records store the
//! PHC hash alone. The token is a marker string, not a credential.

use crate::config::{AUTH_TOKEN_KEY, CURRENT_USER_KEY};
use crate::crypto;
use crate::error::{AppError, Result};
use crate::models::{Role, User};
use crate::store::{Collection, KvStore};
use uuid::Uuid;

/// Service for session state and authentication
#[derive(Clone)]
pub struct SessionService {
    users: Collection<User>,
    kv: KvStore,
}

impl SessionService {
    pub fn new(kv: KvStore) -> Self {
        Self {
            users: Collection::new(kv.clone()),
            kv,
        }
    }

    /// The signed-in user, if any. A malformed stored record is logged and
    /// treated as signed out.
    pub async fn current_user(&self) -> Result<Option<User>> {
        let Some(raw) = self.kv.get(CURRENT_USER_KEY).await else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Stored session user is malformed, ignoring: {}", e);
                Ok(None)
            }
        }
    }

    /// Store the signed-in user record
    pub async fn set_current_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.kv.put(CURRENT_USER_KEY, &json).await
    }

    /// The session token, if any
    pub async fn user_token(&self) -> Option<String> {
        self.kv.get(AUTH_TOKEN_KEY).await
    }

    pub async fn set_user_token(&self, token: &str) -> Result<()> {
        self.kv.put(AUTH_TOKEN_KEY, token).await
    }

    /// Drop the session user and token in one batch
    pub async fn remove_auth_data(&self) -> Result<()> {
        self.kv
            .remove_many(&[CURRENT_USER_KEY, AUTH_TOKEN_KEY])
            .await?;

        tracing::info!("Session cleared");

        Ok(())
    }

    /// Create an account and sign it in. The email must not collide with an
    /// existing account (case-insensitive).
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User> {
        let email_lower = email.to_lowercase();
        let taken = self
            .users
            .get_all()
            .await?
            .iter()
            .any(|u| u.email.to_lowercase() == email_lower);
        if taken {
            return Err(AppError::Credentials(format!(
                "An account already exists for {}",
                email
            )));
        }

        let mut user = User::new(name, email, role);
        user.password_hash = Some(crypto::hash_password(password)?);

        let user = self.users.save(user).await?;
        self.start_session(&user).await?;

        tracing::info!("Registered user {}", user.id);

        Ok(user)
    }

    /// Verify credentials and sign the user in. Unknown email, an account
    /// without a stored hash, and a wrong password all fail the same way.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let email_lower = email.to_lowercase();
        let user = self
            .users
            .get_all()
            .await?
            .into_iter()
            .find(|u| u.email.to_lowercase() == email_lower);

        let Some(user) = user else {
            return Err(invalid_credentials());
        };
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(invalid_credentials());
        };
        if !crypto::verify_password(password, hash)? {
            return Err(invalid_credentials());
        }

        self.start_session(&user).await?;

        tracing::info!("User {} logged in", user.id);

        Ok(user)
    }

    async fn start_session(&self, user: &User) -> Result<()> {
        self.set_current_user(user).await?;
        self.set_user_token(&Uuid::new_v4().to_string()).await
    }
}

fn invalid_credentials() -> AppError {
    AppError::Credentials("Invalid email or password".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_test_service() -> (SessionService, KvStore) {
        let kv = KvStore::in_memory().await.unwrap();
        (SessionService::new(kv.clone()), kv)
    }

    #[tokio::test]
    async fn test_register_starts_session() {
        let (service, _kv) = create_test_service().await;

        let user = service
            .register("Ana", "ana@example.com", "s3cret!", Role::Admin)
            .await
            .unwrap();

        assert!(!user.id.is_empty());
        assert!(user.password_hash.as_deref().unwrap().starts_with("$argon2"));

        let current = service.current_user().await.unwrap().unwrap();
        assert_eq!(current.id, user.id);
        assert!(service.user_token().await.is_some());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let (service, _kv) = create_test_service().await;

        service
            .register("Ana", "Ana@example.com", "pw1", Role::Collaborator)
            .await
            .unwrap();

        let result = service
            .register("Impostor", "ana@EXAMPLE.com", "pw2", Role::Collaborator)
            .await;

        assert!(matches!(result, Err(AppError::Credentials(_))));
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let (service, _kv) = create_test_service().await;

        let registered = service
            .register("Ana", "ana@example.com", "s3cret!", Role::Collaborator)
            .await
            .unwrap();
        service.remove_auth_data().await.unwrap();
        assert!(service.current_user().await.unwrap().is_none());

        let logged_in = service.login("ana@example.com", "s3cret!").await.unwrap();
        assert_eq!(logged_in.id, registered.id);
        assert!(service.user_token().await.is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let (service, _kv) = create_test_service().await;

        service
            .register("Ana", "ana@example.com", "right", Role::Collaborator)
            .await
            .unwrap();

        assert!(matches!(
            service.login("ana@example.com", "wrong").await,
            Err(AppError::Credentials(_))
        ));
        assert!(matches!(
            service.login("nobody@example.com", "right").await,
            Err(AppError::Credentials(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_session_user_ignored() {
        let (service, kv) = create_test_service().await;

        kv.put(CURRENT_USER_KEY, "{broken json").await.unwrap();

        assert!(service.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_auth_data() {
        let (service, _kv) = create_test_service().await;

        service
            .register("Ana", "ana@example.com", "pw", Role::Collaborator)
            .await
            .unwrap();

        service.remove_auth_data().await.unwrap();

        assert!(service.current_user().await.unwrap().is_none());
        assert!(service.user_token().await.is_none());
    }
}
