use log::{info, warn};
use std::sync::Arc;

use laurentia_shared::remote::InviteService;
use laurentia_shared::store::IdentityStore;

use crate::errors::{Result, SubmitError};
use crate::state::{DerivedState, InviteStateMachine};

/// Handles the visitor's explicit actions: asking for an invite, or
/// forgetting the stored email.
pub struct SubmissionController<C, S> {
    machine: Arc<InviteStateMachine<C, S>>,
}

impl<C, S> SubmissionController<C, S>
where
    C: InviteService,
    S: IdentityStore,
{
    pub fn new(machine: Arc<InviteStateMachine<C, S>>) -> Self {
        Self { machine }
    }

    pub fn machine(&self) -> &Arc<InviteStateMachine<C, S>> {
        &self.machine
    }

    /// Stores `email`, requests an invite, then refetches so the visitor sees
    /// the backend's post-submission state. A failed invite request is not
    /// retried; the refetch happens either way.
    pub async fn submit(&self, id: &str, name: &str, email: &str) -> Result<DerivedState> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SubmitError::EmptyEmail);
        }

        // Persist first so a lost response still leaves the visitor known.
        self.machine.store().save_email(email).await?;

        info!("Requesting invite for event {}/{}", id, name);
        let settled = self
            .machine
            .service()
            .submit_invite(id, name, email, self.machine.cancellation())
            .await;

        if settled.is_none() {
            warn!(
                "Invite request for event {}/{} did not settle cleanly, refetching anyway",
                id, name
            );
        }

        Ok(self.machine.refetch(id, name).await)
    }

    /// Forgets the stored email and reloads, so the visitor is unknown again.
    pub async fn change_email(&self) -> Result<DerivedState> {
        self.machine.store().clear_email().await?;
        info!("Visitor email cleared");
        Ok(self.machine.reload().await)
    }
}
