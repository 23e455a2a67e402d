use async_trait::async_trait;

use crate::errors::StoreError;

pub mod file;

/// Key under which the visitor's email is persisted.
pub const EMAIL_KEY: &str = "email";

/// Durable, device-scoped storage for the visitor's self-reported email.
///
/// The identity is not tied to any event; once saved it is reused for every
/// request until cleared.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_email(&self) -> Result<Option<String>, StoreError>;
    /// Overwrites any stored email. No format validation happens here.
    async fn save_email(&self, email: &str) -> Result<(), StoreError>;
    async fn clear_email(&self) -> Result<(), StoreError>;
}
