use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::models::InvitationRecord;
use crate::remote::InviteService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Get {
        id: String,
        name: String,
        email: Option<String>,
    },
    Invite {
        id: String,
        name: String,
        email: String,
    },
}

#[derive(Debug, Default)]
struct Script {
    fetch_responses: VecDeque<Option<InvitationRecord>>,
    invite_responses: VecDeque<Option<InvitationRecord>>,
    calls: Vec<RecordedCall>,
}

/// Scripted invite service. Responses are consumed in order; an exhausted
/// queue answers `None`, like a failed request.
///
/// A gated service holds every `fetch_status` call until `open_gate` hands
/// out a permit, which keeps fetches in flight for concurrency tests.
#[derive(Debug, Default)]
pub struct MockInviteService {
    script: Mutex<Script>,
    gate: Option<Arc<Semaphore>>,
}

impl MockInviteService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            script: Mutex::new(Script::default()),
            gate: Some(Arc::new(Semaphore::new(0))),
        }
    }

    pub fn push_fetch(&self, response: Option<InvitationRecord>) {
        self.script().fetch_responses.push_back(response);
    }

    pub fn push_invite(&self, response: Option<InvitationRecord>) {
        self.script().invite_responses.push_back(response);
    }

    pub fn open_gate(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script().calls.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Get { .. }))
            .count()
    }

    pub fn invite_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Invite { .. }))
            .count()
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl InviteService for MockInviteService {
    async fn fetch_status(
        &self,
        id: &str,
        name: &str,
        email: Option<&str>,
        cancel: &CancellationToken,
    ) -> Option<InvitationRecord> {
        self.script().calls.push(RecordedCall::Get {
            id: id.to_string(),
            name: name.to_string(),
            email: email.map(str::to_string),
        });

        if let Some(gate) = &self.gate {
            tokio::select! {
                _ = cancel.cancelled() => return None,
                permit = gate.acquire() => {
                    if let Ok(permit) = permit {
                        permit.forget();
                    }
                }
            }
        }

        self.script().fetch_responses.pop_front().flatten()
    }

    async fn submit_invite(
        &self,
        id: &str,
        name: &str,
        email: &str,
        _cancel: &CancellationToken,
    ) -> Option<InvitationRecord> {
        let mut script = self.script();
        script.calls.push(RecordedCall::Invite {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        });
        script.invite_responses.pop_front().flatten()
    }
}
