pub mod mock_identity_store;
pub mod mock_invite_service;
pub mod test_logging;

pub use mock_identity_store::MockIdentityStore;
pub use mock_invite_service::{MockInviteService, RecordedCall};

use chrono::{TimeZone, Utc};

use crate::models::{InvitationRecord, InviteState};

/// A fully populated record for the given state.
pub fn sample_record(invite_state: InviteState) -> InvitationRecord {
    InvitationRecord {
        name: "Winter party".to_string(),
        start_date: Utc.with_ymd_and_hms(2024, 12, 24, 18, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2024, 12, 24, 22, 0, 0).unwrap(),
        location: Some("Main Street 1".to_string()),
        location_url: None,
        invite_state,
        body: None,
    }
}
