use std::sync::Arc;

use lazy_static::lazy_static;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, CredentialsRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{StoreError, UserStore},
        repo_types::{NewProfile, User},
    },
    error::{AppError, Result},
};

lazy_static! {
    // Verified against on unknown-email logins so both failure paths cost one argon2 run.
    static ref DUMMY_HASH: Option<String> = hash_password("not-a-real-password").ok();
}

/// Register, login and account deletion over an injected store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    fn issue_pair(&self, user: &User) -> Result<AuthResponse> {
        Ok(AuthResponse {
            access_token: self.keys.sign_access(user.id)?,
            refresh_token: self.keys.sign_refresh(user.id)?,
            expires_in: self.keys.access_ttl_secs(),
        })
    }

    #[instrument(skip(self, payload))]
    pub async fn register(&self, payload: CredentialsRequest) -> Result<AuthResponse> {
        let creds = payload
            .validate_register()
            .map_err(AppError::ValidationFailed)?;

        if self.store.find_by_email(&creds.email).await?.is_some() {
            warn!(email = %creds.email, "email already registered");
            return Err(AppError::DuplicateEmail);
        }

        let hash = hash_password(&creds.password)?;
        // a concurrent register can still win the race; the store's constraint decides
        let user = match self
            .store
            .create(&creds.email, &hash, NewProfile::default())
            .await
        {
            Ok(u) => u,
            Err(StoreError::DuplicateEmail) => {
                warn!(email = %creds.email, "email taken at insert");
                return Err(AppError::DuplicateEmail);
            }
            Err(StoreError::Backend(e)) => return Err(e.into()),
        };

        let tokens = self.issue_pair(&user)?;
        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(tokens)
    }

    #[instrument(skip(self, payload))]
    pub async fn login(&self, payload: CredentialsRequest) -> Result<AuthResponse> {
        let creds = payload.validate_login().map_err(AppError::ValidationFailed)?;

        let Some(user) = self.store.find_by_email(&creds.email).await? else {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                let _ = verify_password(&creds.password, hash);
            }
            warn!(email = %creds.email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(&creds.password, &user.password_hash)? {
            warn!(user_id = user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self.issue_pair(&user)?;
        info!(user_id = user.id, "user logged in");
        Ok(tokens)
    }

    /// Deletes the account named by a valid access token. A token outliving
    /// its account fails the lookup, not the verification.
    #[instrument(skip(self, token))]
    pub async fn delete_account(&self, token: Option<&str>) -> Result<()> {
        let claims = self.keys.verify_access(token)?;

        if self.store.find_by_id(claims.sub).await?.is_none() {
            warn!(user_id = claims.sub, "delete for missing account");
            return Err(AppError::AccountNotFound);
        }
        if !self.store.delete(claims.sub).await? {
            // removed between lookup and delete
            return Err(AppError::AccountNotFound);
        }

        info!(user_id = claims.sub, "account deleted");
        Ok(())
    }

    /// Refresh-token exchange is not offered. The presented token is still
    /// checked so callers get the usual token errors first.
    #[instrument(skip(self, token))]
    pub async fn refresh(&self, token: Option<&str>) -> Result<AuthResponse> {
        let claims = self.keys.verify_refresh(token)?;
        warn!(user_id = claims.sub, "refresh requested but not available");
        Err(AppError::RefreshUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::MemoryUserStore;
    use crate::config::AppConfig;
    use async_trait::async_trait;

    fn keys() -> JwtKeys {
        JwtKeys::from(&AppConfig::test_default().jwt)
    }

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryUserStore::new()), keys())
    }

    /// Store that loses every insert race: the email looks free, then the
    /// constraint rejects it.
    struct RacingStore;

    #[async_trait]
    impl UserStore for RacingStore {
        async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
            Ok(None)
        }
        async fn find_by_id(&self, _id: i64) -> anyhow::Result<Option<User>> {
            Ok(None)
        }
        async fn create(
            &self,
            _email: &str,
            _password_hash: &str,
            _profile: NewProfile,
        ) -> std::result::Result<User, StoreError> {
            Err(StoreError::DuplicateEmail)
        }
        async fn admin_exists(&self) -> anyhow::Result<bool> {
            Ok(false)
        }
        async fn delete(&self, _id: i64) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    fn creds(email: &str, password: &str) -> CredentialsRequest {
        CredentialsRequest {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[tokio::test]
    async fn register_then_duplicate() {
        let svc = service();
        let tokens = svc.register(creds("a@b.com", "abcdef1")).await.unwrap();
        assert!(!tokens.access_token.is_empty());
        assert!(!tokens.refresh_token.is_empty());
        assert_eq!(tokens.expires_in, 900);

        let err = svc.register(creds("a@b.com", "abcdef1")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[tokio::test]
    async fn register_email_is_case_insensitive() {
        let svc = service();
        svc.register(creds("a@b.com", "abcdef1")).await.unwrap();
        let err = svc.register(creds("A@B.COM", "abcdef1")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[tokio::test]
    async fn insert_conflict_is_duplicate_email() {
        let svc = AuthService::new(Arc::new(RacingStore), keys());
        let err = svc.register(creds("a@b.com", "abcdef1")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail), "got {err:?}");
    }

    #[tokio::test]
    async fn registered_token_subject_is_new_user() {
        let store = Arc::new(MemoryUserStore::new());
        let svc = AuthService::new(store.clone(), keys());
        let tokens = svc.register(creds("a@b.com", "abcdef1")).await.unwrap();
        let claims = svc.keys().verify(&tokens.access_token).unwrap();
        let user = svc.store().find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(claims.sub, user.id);
        assert!(store.find_profile(user.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn register_rejects_invalid_body() {
        let svc = service();
        let err = svc
            .register(CredentialsRequest::default())
            .await
            .unwrap_err();
        match err {
            AppError::ValidationFailed(v) => assert_eq!(v.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let svc = service();
        svc.register(creds("a@b.com", "abcdef1")).await.unwrap();

        let unknown = svc.login(creds("x@b.com", "abcdef1")).await.unwrap_err();
        let wrong = svc.login(creds("a@b.com", "wrong")).await.unwrap_err();
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn dummy_hash_is_usable() {
        let hash = DUMMY_HASH.as_deref().expect("dummy hash");
        assert!(!verify_password("abcdef1", hash).unwrap());
    }

    #[tokio::test]
    async fn login_issues_fresh_pair() {
        let svc = service();
        svc.register(creds("a@b.com", "abcdef1")).await.unwrap();
        let tokens = svc.login(creds("a@b.com", "abcdef1")).await.unwrap();
        assert_eq!(tokens.expires_in, 900);
        assert!(svc.keys().verify_access(Some(tokens.access_token.as_str())).is_ok());
    }

    #[tokio::test]
    async fn delete_twice_reports_missing_account() {
        let svc = service();
        let tokens = svc.register(creds("a@b.com", "abcdef1")).await.unwrap();

        svc.delete_account(Some(tokens.access_token.as_str())).await.unwrap();
        let err = svc
            .delete_account(Some(tokens.access_token.as_str()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound));
    }

    #[tokio::test]
    async fn delete_token_failures() {
        let svc = service();
        let tokens = svc.register(creds("a@b.com", "abcdef1")).await.unwrap();

        assert!(matches!(
            svc.delete_account(None).await.unwrap_err(),
            AppError::Unauthorized
        ));
        assert!(matches!(
            svc.delete_account(Some("not.a.jwt")).await.unwrap_err(),
            AppError::TokenInvalid
        ));
        assert!(matches!(
            svc.delete_account(Some(tokens.refresh_token.as_str()))
                .await
                .unwrap_err(),
            AppError::TokenInvalid
        ));
    }

    #[tokio::test]
    async fn refresh_verifies_then_declines() {
        let svc = service();
        let tokens = svc.register(creds("a@b.com", "abcdef1")).await.unwrap();

        assert!(matches!(
            svc.refresh(Some(tokens.refresh_token.as_str())).await.unwrap_err(),
            AppError::RefreshUnavailable
        ));
        assert!(matches!(
            svc.refresh(Some(tokens.access_token.as_str())).await.unwrap_err(),
            AppError::TokenInvalid
        ));
        assert!(matches!(
            svc.refresh(None).await.unwrap_err(),
            AppError::Unauthorized
        ));
    }
}
