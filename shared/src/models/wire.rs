//! Wire shapes exchanged with the invite endpoint.
//!
//! The backend answers with lower-cased field names (`startdate`,
//! `invitestate`, ...) nested under `Reply.Result`. Both the lower-cased and
//! the camel-cased spellings are accepted, then normalized into
//! [`InvitationRecord`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{InvitationRecord, InviteState};
use crate::errors::InviteError;

/// Outbound request body, tagged by `mode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RequestEnvelope<'a> {
    Get {
        id: &'a str,
        name: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        email: Option<&'a str>,
    },
    Invite {
        id: &'a str,
        name: &'a str,
        email: &'a str,
    },
}

impl RequestEnvelope<'_> {
    pub fn mode(&self) -> &'static str {
        match self {
            RequestEnvelope::Get { .. } => "get",
            RequestEnvelope::Invite { .. } => "invite",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "Reply", default)]
    pub reply: Option<Reply>,
}

#[derive(Debug, Deserialize)]
pub struct Reply {
    #[serde(rename = "Result", default)]
    pub result: Option<WireInvitation>,
}

#[derive(Debug, Deserialize)]
pub struct WireInvitation {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "startdate", alias = "startDate")]
    pub start_date: String,
    #[serde(rename = "enddate", alias = "endDate")]
    pub end_date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "locationurl", alias = "locationUrl", default)]
    pub location_url: Option<String>,
    /// A missing tag is kept as an empty unrecognized state.
    #[serde(rename = "invitestate", alias = "inviteState", default)]
    pub invite_state: InviteState,
    #[serde(default)]
    pub body: Option<String>,
}

impl ResponseEnvelope {
    /// Parses a raw response body and normalizes the nested result.
    pub fn parse(body: &str) -> Result<InvitationRecord, InviteError> {
        let envelope: ResponseEnvelope = serde_json::from_str(body)
            .map_err(|e| InviteError::malformed(format!("invalid response body: {}", e)))?;
        envelope.into_record()
    }

    pub fn into_record(self) -> Result<InvitationRecord, InviteError> {
        self.reply
            .and_then(|reply| reply.result)
            .ok_or_else(|| InviteError::malformed("response has no Reply.Result"))?
            .try_into()
    }
}

impl TryFrom<WireInvitation> for InvitationRecord {
    type Error = InviteError;

    fn try_from(wire: WireInvitation) -> Result<Self, Self::Error> {
        Ok(InvitationRecord {
            start_date: parse_timestamp(&wire.start_date)?,
            end_date: parse_timestamp(&wire.end_date)?,
            name: wire.name,
            location: non_blank(wire.location),
            location_url: non_blank(wire.location_url),
            invite_state: wire.invite_state,
            body: non_blank(wire.body),
        })
    }
}

/// Accepts RFC 3339, an ISO-8601 date-time without offset taken as UTC, or a
/// bare date taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, InviteError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| InviteError::malformed(format!("unparseable timestamp '{}'", raw)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
