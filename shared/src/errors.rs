use thiserror::Error;

/// Failures of a single round trip to the invite endpoint.
///
/// The client collapses these to an absent result at its boundary; they exist
/// so the cause can be logged.
#[derive(Error, Debug)]
pub enum InviteError {
    #[error("Transport failure: {0}")]
    TransportFailure(#[from] reqwest::Error),

    #[error("Invite endpoint returned status {0}")]
    UnexpectedStatus(u16),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unknown invite state: {0}")]
    UnknownInviteState(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl InviteError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        InviteError::MalformedResponse(msg.into())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Identity store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Identity store is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("No data directory available for the identity store")]
    NoDataDir,
}
