use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::{
    repo::{StoreError, UserStore},
    repo_types::{NewProfile, Profile, User},
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: HashMap<i64, User>,
    profiles: HashMap<i64, Profile>,
}

/// Process-local store. The email check and the insert happen under one lock.
#[derive(Default)]
pub struct MemoryUserStore {
    tables: Mutex<Tables>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }

    pub fn user_count(&self) -> anyhow::Result<usize> {
        Ok(self.lock()?.users.len())
    }

    /// Profile lookup for tests; the service never reads profiles.
    pub fn find_profile(&self, user_id: i64) -> anyhow::Result<Option<Profile>> {
        Ok(self.lock()?.profiles.get(&user_id).cloned())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        profile: NewProfile,
    ) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        tables.next_id += 1;
        let user = User {
            id: tables.next_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.insert(user.id, user.clone());
        tables.profiles.insert(user.id, profile.into_profile(user.id));
        Ok(user)
    }

    async fn admin_exists(&self) -> anyhow::Result<bool> {
        Ok(self.lock()?.profiles.values().any(|p| p.admin))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut tables = self.lock()?;
        let removed = tables.users.remove(&id).is_some();
        if removed {
            tables.profiles.remove(&id);
        }
        Ok(removed)
    }
}
