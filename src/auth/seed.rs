use tracing::{info, instrument};

use crate::{
    auth::{
        password::hash_password,
        repo::{StoreError, UserStore},
        repo_types::NewProfile,
    },
    config::SeedConfig,
};

/// Creates the admin account unless it, or any other admin, already exists.
///
/// Returns the id of the account created by this call, if any. Skipped when
/// no admin password is configured.
#[instrument(skip_all, fields(email = %seed.admin_email))]
pub async fn seed_admin(store: &dyn UserStore, seed: &SeedConfig) -> anyhow::Result<Option<i64>> {
    let Some(password) = seed.admin_password.as_deref() else {
        info!("no admin password configured; skipping seed");
        return Ok(None);
    };
    let email = seed.admin_email.trim().to_lowercase();

    if store.find_by_email(&email).await?.is_some() || store.admin_exists().await? {
        info!("admin already present");
        return Ok(None);
    }

    let hash = hash_password(password)?;
    let profile = NewProfile {
        admin: true,
        ..NewProfile::default()
    };
    match store.create(&email, &hash, profile).await {
        Ok(user) => {
            info!(user_id = user.id, "admin seeded");
            Ok(Some(user.id))
        }
        // another instance seeded first
        Err(StoreError::DuplicateEmail) => Ok(None),
        Err(StoreError::Backend(e)) => Err(e),
    }
}
