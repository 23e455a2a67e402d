use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::store::IdentityStore;

/// In-memory identity store for tests.
#[derive(Debug, Default)]
pub struct MockIdentityStore {
    email: RwLock<Option<String>>,
}

impl MockIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(email: &str) -> Self {
        Self {
            email: RwLock::new(Some(email.to_string())),
        }
    }
}

#[async_trait]
impl IdentityStore for MockIdentityStore {
    async fn get_email(&self) -> Result<Option<String>, StoreError> {
        Ok(self.email.read().await.clone())
    }

    async fn save_email(&self, email: &str) -> Result<(), StoreError> {
        *self.email.write().await = Some(email.to_string());
        Ok(())
    }

    async fn clear_email(&self) -> Result<(), StoreError> {
        *self.email.write().await = None;
        Ok(())
    }
}
