use laurentia_shared::errors::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Email must not be empty")]
    EmptyEmail,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SubmitError>;
