use chrono::{DateTime, Utc};

use laurentia_invitation_service::DerivedState;
use laurentia_shared::models::InvitationRecord;

pub fn render(state: &DerivedState) -> String {
    let status = match state {
        DerivedState::Loading => {
            return "Loading data...\nIf this takes too long, try again.".to_string()
        }
        DerivedState::Error => {
            return "Error\nEither the link you were given is wrong or the invite service is unavailable. Try again."
                .to_string()
        }
        DerivedState::Invited(_) => "You've been invited!".to_string(),
        DerivedState::Confirming { email, .. } => format!(
            "Verifying {} to make sure invites are not abused.\nIncorrect email? Run again with --change-email.",
            email.as_deref().unwrap_or("your email")
        ),
        DerivedState::NotInvited(_) => {
            "Not invited yet. Run again with --email <address> to get a calendar invite.".to_string()
        }
        DerivedState::Unknown(record) => format!(
            "Undefined invite state '{}'. Please report this.",
            record.invite_state
        ),
    };

    match state.record() {
        Some(record) => format!("{}\n\n{}", render_event(record), status),
        None => status,
    }
}

fn render_event(record: &InvitationRecord) -> String {
    let mut lines = vec![
        record.name.clone(),
        format!("  When:  {}", render_span(record.start_date, record.end_date)),
    ];

    if let (Some(location), Some(map_url)) = (&record.location, record.map_search_url()) {
        lines.push(format!("  Where: {} ({})", location, map_url));
    }
    if let Some(url) = &record.location_url {
        lines.push(format!("  Online: {}", url));
    }
    if let Some(body) = &record.body {
        lines.push(String::new());
        lines.push(body.clone());
    }

    lines.join("\n")
}

fn render_span(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "{} {}-{} UTC",
        start.format("%A %d %b %Y"),
        start.format("%H:%M"),
        end.format("%H:%M")
    )
}
