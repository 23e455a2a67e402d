use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use laurentia_shared::errors::InviteError;
use laurentia_shared::models::{EventKey, InvitationRecord, InviteState};
use laurentia_shared::remote::InviteService;
use laurentia_shared::store::IdentityStore;

const TRANSITION_CAPACITY: usize = 32;

/// Lifecycle state shown to the visitor.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedState {
    Loading,
    /// The fetch failed or the backend had nothing to say. The cause is not
    /// distinguishable from here.
    Error,
    NotInvited(InvitationRecord),
    /// Waiting for the visitor to confirm `email`.
    Confirming {
        record: InvitationRecord,
        email: Option<String>,
    },
    Invited(InvitationRecord),
    /// The backend reported a status tag outside the known lifecycle.
    Unknown(InvitationRecord),
}

impl DerivedState {
    pub fn record(&self) -> Option<&InvitationRecord> {
        match self {
            DerivedState::Loading | DerivedState::Error => None,
            DerivedState::NotInvited(record)
            | DerivedState::Invited(record)
            | DerivedState::Unknown(record)
            | DerivedState::Confirming { record, .. } => Some(record),
        }
    }

    /// Only a visitor the backend has not invited gets the email form.
    pub fn offers_submission_form(&self) -> bool {
        matches!(self, DerivedState::NotInvited(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            DerivedState::Loading => "loading",
            DerivedState::Error => "error",
            DerivedState::NotInvited(_) => "not-invited",
            DerivedState::Confirming { .. } => "confirming",
            DerivedState::Invited(_) => "invited",
            DerivedState::Unknown(_) => "unknown",
        }
    }
}

/// Maps a fetch outcome and the stored visitor email onto a lifecycle state.
pub fn derive_state(outcome: Option<InvitationRecord>, email: Option<String>) -> DerivedState {
    let record = match outcome {
        Some(record) => record,
        None => return DerivedState::Error,
    };

    match &record.invite_state {
        InviteState::NotInvited => DerivedState::NotInvited(record),
        InviteState::Confirming => DerivedState::Confirming { record, email },
        InviteState::Invited => DerivedState::Invited(record),
        InviteState::Unrecognized(tag) => {
            error!(
                "{} for event '{}'",
                InviteError::UnknownInviteState(tag.clone()),
                record.name
            );
            DerivedState::Unknown(record)
        }
    }
}

struct Inner {
    key: Option<EventKey>,
    generation: u64,
    state: DerivedState,
}

/// Resolves and holds the invite state for one event at a time.
///
/// Loads are deduplicated by `(id, name)`: once a fetch has been issued for a
/// pair, further loads of the same pair return the current state without
/// another request, whether the first fetch is still in flight or settled.
/// `reload` and `refetch` always fetch again and supersede any fetch still in
/// flight.
pub struct InviteStateMachine<C, S> {
    service: Arc<C>,
    store: Arc<S>,
    inner: Mutex<Inner>,
    transitions: broadcast::Sender<DerivedState>,
    cancel: CancellationToken,
}

impl<C, S> InviteStateMachine<C, S>
where
    C: InviteService,
    S: IdentityStore,
{
    pub fn new(service: Arc<C>, store: Arc<S>) -> Self {
        let (transitions, _) = broadcast::channel(TRANSITION_CAPACITY);
        Self {
            service,
            store,
            inner: Mutex::new(Inner {
                key: None,
                generation: 0,
                state: DerivedState::Loading,
            }),
            transitions,
            cancel: CancellationToken::new(),
        }
    }

    pub fn service(&self) -> &Arc<C> {
        &self.service
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn state(&self) -> DerivedState {
        self.lock().state.clone()
    }

    pub fn current_key(&self) -> Option<EventKey> {
        self.lock().key.clone()
    }

    /// Receives every visible state change from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<DerivedState> {
        self.transitions.subscribe()
    }

    /// Resolves the state for `(id, name)`, fetching at most once per pair.
    pub async fn load(&self, id: &str, name: &str) -> DerivedState {
        let key = EventKey::new(id, name);
        let generation = {
            let mut inner = self.lock();
            if inner.key.as_ref() == Some(&key) {
                debug!("Fetch for {} already issued, suppressing duplicate", key);
                return inner.state.clone();
            }
            inner.key = Some(key.clone());
            self.begin(&mut inner)
        };

        self.resolve(key, generation).await
    }

    /// Forces a fresh fetch for the current event, re-entering `Loading`.
    pub async fn reload(&self) -> DerivedState {
        match self.current_key() {
            Some(key) => self.refetch(&key.id, &key.name).await,
            None => {
                warn!("Reload requested before any event was loaded");
                self.state()
            }
        }
    }

    /// Forces a fresh fetch for `(id, name)`, making it the current event.
    pub async fn refetch(&self, id: &str, name: &str) -> DerivedState {
        let key = EventKey::new(id, name);
        let generation = {
            let mut inner = self.lock();
            inner.key = Some(key.clone());
            self.begin(&mut inner)
        };

        self.resolve(key, generation).await
    }

    /// Abandons in-flight fetches. Results that arrive afterwards are dropped.
    pub fn shutdown(&self) {
        info!("Shutting down invite state machine");
        self.cancel.cancel();
    }

    pub(crate) fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    fn begin(&self, inner: &mut Inner) -> u64 {
        inner.generation += 1;
        self.transition(inner, DerivedState::Loading);
        inner.generation
    }

    async fn resolve(&self, key: EventKey, generation: u64) -> DerivedState {
        let email = match self.store.get_email().await {
            Ok(email) => email.filter(|e| !e.is_empty()),
            Err(e) => {
                warn!("Could not read visitor email, continuing without it: {}", e);
                None
            }
        };

        info!(
            "Fetching invite status for {} (visitor {})",
            key,
            if email.is_some() { "known" } else { "unknown" }
        );

        let outcome = self
            .service
            .fetch_status(&key.id, &key.name, email.as_deref(), &self.cancel)
            .await;

        let mut inner = self.lock();
        if self.cancel.is_cancelled() {
            debug!("Dropping fetch result for {} after shutdown", key);
            return inner.state.clone();
        }
        if inner.generation != generation {
            debug!(
                "Dropping superseded fetch result for {} (generation {} < {})",
                key, generation, inner.generation
            );
            return inner.state.clone();
        }

        let next = derive_state(outcome, email);
        info!("Invite state for {} resolved to {}", key, next.label());
        self.transition(&mut inner, next.clone());
        next
    }

    fn transition(&self, inner: &mut Inner, next: DerivedState) {
        if inner.state == next {
            return;
        }
        inner.state = next.clone();
        // No receivers is fine; nobody is watching.
        let _ = self.transitions.send(next);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
