use std::env;
use std::path::PathBuf;

use log::{info, warn};

use crate::errors::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://zeus-laurentia.azurewebsites.net/api/run/invite-data";

const ENDPOINT_VAR: &str = "LAURENTIA_ENDPOINT";
const AUTH_TOKEN_VAR: &str = "LAURENTIA_AUTH_TOKEN";
const IDENTITY_PATH_VAR: &str = "LAURENTIA_IDENTITY_PATH";

/// Connection settings for the remote invite endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Shared credential sent verbatim in the `Authorization` header.
    pub auth_token: String,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: auth_token.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = env::var(ENDPOINT_VAR).unwrap_or_else(|_| {
            warn!(
                "{} not set, using default endpoint {}",
                ENDPOINT_VAR, DEFAULT_ENDPOINT
            );
            DEFAULT_ENDPOINT.to_string()
        });

        let auth_token = env::var(AUTH_TOKEN_VAR)
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::Missing(AUTH_TOKEN_VAR))?;

        Ok(Self::new(endpoint, auth_token))
    }
}

/// Location of the durable visitor identity file.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub path: PathBuf,
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = match env::var(IDENTITY_PATH_VAR) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => dirs::data_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join("laurentia")
                .join("identity.json"),
        };

        info!("Visitor identity stored at {}", path.display());
        Ok(Self { path })
    }
}
