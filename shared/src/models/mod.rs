use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod wire;

const MAP_SEARCH_URL: &str = "https://www.google.com/maps/search/";

/// Invite lifecycle status as reported by the backend.
///
/// Tags outside the known three are kept verbatim in `Unrecognized` so the
/// caller can decide how to surface them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InviteState {
    NotInvited,
    Confirming,
    Invited,
    Unrecognized(String),
}

impl InviteState {
    pub fn as_str(&self) -> &str {
        match self {
            InviteState::NotInvited => "not-invited",
            InviteState::Confirming => "confirming",
            InviteState::Invited => "invited",
            InviteState::Unrecognized(tag) => tag,
        }
    }
}

impl Default for InviteState {
    fn default() -> Self {
        InviteState::Unrecognized(String::new())
    }
}

impl From<String> for InviteState {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "not-invited" => InviteState::NotInvited,
            "confirming" => InviteState::Confirming,
            "invited" => InviteState::Invited,
            _ => InviteState::Unrecognized(tag),
        }
    }
}

impl From<InviteState> for String {
    fn from(state: InviteState) -> Self {
        match state {
            InviteState::Unrecognized(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InviteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical invitation record, rebuilt from every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationRecord {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub location_url: Option<String>,
    pub invite_state: InviteState,
    /// Optional HTML description of the event.
    pub body: Option<String>,
}

impl InvitationRecord {
    /// Map search link for the free-text venue, if there is one.
    pub fn map_search_url(&self) -> Option<String> {
        self.location
            .as_ref()
            .map(|location| format!("{}{}", MAP_SEARCH_URL, location))
    }
}

/// Event identifier plus the human-readable alias it was shared under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub id: String,
    pub name: String,
}

impl EventKey {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id, self.name)
    }
}
