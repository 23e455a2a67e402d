use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::errors::InviteError;
use crate::models::wire::{RequestEnvelope, ResponseEnvelope};
use crate::models::InvitationRecord;

/// The two calls the invite endpoint understands.
///
/// Both fail soft: any transport, status or shape failure is logged and
/// returned as `None`, so callers cannot tell a failed request apart from a
/// visitor the backend does not know.
#[async_trait]
pub trait InviteService: Send + Sync {
    async fn fetch_status(
        &self,
        id: &str,
        name: &str,
        email: Option<&str>,
        cancel: &CancellationToken,
    ) -> Option<InvitationRecord>;

    /// Callers persist `email` before calling this.
    async fn submit_invite(
        &self,
        id: &str,
        name: &str,
        email: &str,
        cancel: &CancellationToken,
    ) -> Option<InvitationRecord>;
}

/// HTTP client for the invite endpoint. One best-effort round trip per call,
/// no retries.
#[derive(Debug, Clone)]
pub struct RemoteInviteClient {
    http: Client,
    config: ClientConfig,
}

impl RemoteInviteClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(Client::new(), config)
    }

    pub fn with_http_client(http: Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    async fn exchange(
        &self,
        envelope: &RequestEnvelope<'_>,
        cancel: &CancellationToken,
    ) -> Result<InvitationRecord, InviteError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(InviteError::Cancelled),
            result = self.round_trip(envelope) => result,
        }
    }

    async fn round_trip(&self, envelope: &RequestEnvelope<'_>) -> Result<InvitationRecord, InviteError> {
        debug!(
            "Sending '{}' request to {}",
            envelope.mode(),
            self.config.endpoint
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .header(AUTHORIZATION, &self.config.auth_token)
            .header(CONTENT_TYPE, "application/json")
            .json(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return ResponseEnvelope::parse(&body);
        }

        // The backend sometimes answers with a usable reply on an error status.
        match ResponseEnvelope::parse(&body) {
            Ok(record) => {
                warn!(
                    "Invite endpoint returned status {} with a usable reply",
                    status
                );
                Ok(record)
            }
            Err(_) => Err(InviteError::UnexpectedStatus(status.as_u16())),
        }
    }

    async fn settle(
        &self,
        envelope: RequestEnvelope<'_>,
        cancel: &CancellationToken,
    ) -> Option<InvitationRecord> {
        match self.exchange(&envelope, cancel).await {
            Ok(record) => {
                info!(
                    "Invite endpoint answered '{}' request with state '{}'",
                    envelope.mode(),
                    record.invite_state
                );
                Some(record)
            }
            Err(InviteError::Cancelled) => {
                info!("'{}' request cancelled before it settled", envelope.mode());
                None
            }
            Err(e) => {
                error!("'{}' request to invite endpoint failed: {}", envelope.mode(), e);
                None
            }
        }
    }
}

#[async_trait]
impl InviteService for RemoteInviteClient {
    async fn fetch_status(
        &self,
        id: &str,
        name: &str,
        email: Option<&str>,
        cancel: &CancellationToken,
    ) -> Option<InvitationRecord> {
        let envelope = RequestEnvelope::Get {
            id,
            name,
            email: email.filter(|e| !e.is_empty()),
        };
        self.settle(envelope, cancel).await
    }

    async fn submit_invite(
        &self,
        id: &str,
        name: &str,
        email: &str,
        cancel: &CancellationToken,
    ) -> Option<InvitationRecord> {
        let envelope = RequestEnvelope::Invite { id, name, email };
        self.settle(envelope, cancel).await
    }
}
