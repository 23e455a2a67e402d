use tokio::sync::broadcast::error::TryRecvError;

use laurentia_shared::models::InviteState;
use laurentia_shared::test_utils::{
    sample_record, MockIdentityStore, MockInviteService, RecordedCall,
};

use super::create_test_machine;
use crate::state::{derive_state, DerivedState};

#[tokio::test]
async fn test_starts_loading() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());

    assert_eq!(machine.state(), DerivedState::Loading);
    assert!(machine.current_key().is_none());
    assert_eq!(service.fetch_count(), 0);
}

#[tokio::test]
async fn test_invited_hides_form() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());
    service.push_fetch(Some(sample_record(InviteState::Invited)));

    let state = machine.load("ev-1", "winter").await;

    assert_eq!(state, DerivedState::Invited(sample_record(InviteState::Invited)));
    assert!(!state.offers_submission_form());
    assert_eq!(machine.state(), state);
}

#[tokio::test]
async fn test_not_invited_offers_form() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());
    service.push_fetch(Some(sample_record(InviteState::NotInvited)));

    let state = machine.load("ev-1", "winter").await;

    assert!(matches!(state, DerivedState::NotInvited(_)));
    assert!(state.offers_submission_form());
    assert_eq!(
        service.calls(),
        vec![RecordedCall::Get {
            id: "ev-1".to_string(),
            name: "winter".to_string(),
            email: None,
        }]
    );
}

#[tokio::test]
async fn test_absent_result_is_error() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());
    service.push_fetch(None);

    let state = machine.load("ev-1", "winter").await;

    assert_eq!(state, DerivedState::Error);
    assert!(state.record().is_none());
    assert!(!state.offers_submission_form());
}

#[tokio::test]
async fn test_unknown_state_is_distinguishable() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());
    let bogus = sample_record(InviteState::Unrecognized("bogus".to_string()));
    service.push_fetch(Some(bogus.clone()));

    let state = machine.load("ev-1", "winter").await;

    assert_eq!(state, DerivedState::Unknown(bogus));
    assert_eq!(state.label(), "unknown");
    assert!(!state.offers_submission_form());
}

#[tokio::test]
async fn test_missing_state_tag_is_unknown() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());
    let untagged = sample_record(InviteState::default());
    service.push_fetch(Some(untagged.clone()));

    let state = machine.load("ev-1", "winter").await;

    assert_eq!(state, DerivedState::Unknown(untagged));
    assert!(!state.offers_submission_form());
}

#[tokio::test]
async fn test_confirming_carries_stored_email() {
    let (machine, service, _) = create_test_machine(
        MockInviteService::new(),
        MockIdentityStore::with_email("guest@example.org"),
    );
    service.push_fetch(Some(sample_record(InviteState::Confirming)));

    let state = machine.load("ev-1", "winter").await;

    assert_eq!(
        state,
        DerivedState::Confirming {
            record: sample_record(InviteState::Confirming),
            email: Some("guest@example.org".to_string()),
        }
    );
    assert_eq!(
        service.calls(),
        vec![RecordedCall::Get {
            id: "ev-1".to_string(),
            name: "winter".to_string(),
            email: Some("guest@example.org".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_blank_stored_email_is_not_sent() {
    let (machine, service, _) =
        create_test_machine(MockInviteService::new(), MockIdentityStore::with_email(""));
    service.push_fetch(Some(sample_record(InviteState::NotInvited)));

    machine.load("ev-1", "winter").await;

    assert_eq!(
        service.calls(),
        vec![RecordedCall::Get {
            id: "ev-1".to_string(),
            name: "winter".to_string(),
            email: None,
        }]
    );
}

#[tokio::test]
async fn test_concurrent_loads_issue_one_fetch() {
    let (machine, service, _) =
        create_test_machine(MockInviteService::gated(), MockIdentityStore::new());
    service.push_fetch(Some(sample_record(InviteState::Invited)));

    let (first, second, _) = tokio::join!(
        machine.load("ev-1", "winter"),
        machine.load("ev-1", "winter"),
        async {
            tokio::task::yield_now().await;
            service.open_gate(1);
        }
    );

    assert_eq!(service.fetch_count(), 1);
    assert_eq!(first, DerivedState::Invited(sample_record(InviteState::Invited)));
    // The suppressed load sees the fetch still in flight.
    assert_eq!(second, DerivedState::Loading);
    assert_eq!(machine.state(), first);
}

#[tokio::test]
async fn test_repeat_load_after_settle_does_not_refetch() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());
    service.push_fetch(Some(sample_record(InviteState::Invited)));

    let first = machine.load("ev-1", "winter").await;
    let second = machine.load("ev-1", "winter").await;

    assert_eq!(first, second);
    assert_eq!(service.fetch_count(), 1);
}

#[tokio::test]
async fn test_error_is_sticky_until_reload() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());
    service.push_fetch(None);
    service.push_fetch(Some(sample_record(InviteState::Invited)));

    assert_eq!(machine.load("ev-1", "winter").await, DerivedState::Error);
    assert_eq!(machine.load("ev-1", "winter").await, DerivedState::Error);
    assert_eq!(service.fetch_count(), 1);

    let state = machine.reload().await;
    assert!(matches!(state, DerivedState::Invited(_)));
    assert_eq!(service.fetch_count(), 2);
}

#[tokio::test]
async fn test_new_pair_fetches_again() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());
    service.push_fetch(Some(sample_record(InviteState::Invited)));
    service.push_fetch(Some(sample_record(InviteState::NotInvited)));

    machine.load("ev-1", "winter").await;
    let state = machine.load("ev-2", "summer").await;

    assert!(matches!(state, DerivedState::NotInvited(_)));
    assert_eq!(service.fetch_count(), 2);
    assert_eq!(machine.current_key().unwrap().id, "ev-2");
}

#[tokio::test]
async fn test_reload_reenters_loading() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());
    service.push_fetch(Some(sample_record(InviteState::NotInvited)));
    service.push_fetch(Some(sample_record(InviteState::Invited)));

    machine.load("ev-1", "winter").await;
    let mut transitions = machine.subscribe();

    let state = machine.reload().await;

    assert!(matches!(state, DerivedState::Invited(_)));
    assert_eq!(transitions.try_recv().unwrap(), DerivedState::Loading);
    assert_eq!(transitions.try_recv().unwrap(), state);
    assert_eq!(transitions.try_recv().unwrap_err(), TryRecvError::Empty);
}

#[tokio::test]
async fn test_reload_without_event_does_nothing() {
    let (machine, service, _) = create_test_machine(MockInviteService::new(), MockIdentityStore::new());

    assert_eq!(machine.reload().await, DerivedState::Loading);
    assert_eq!(service.fetch_count(), 0);
}

#[tokio::test]
async fn test_superseded_fetch_is_dropped() {
    let (machine, service, _) =
        create_test_machine(MockInviteService::gated(), MockIdentityStore::new());
    // The first fetch answers with the stale state, the forced one with the fresh state.
    service.push_fetch(Some(sample_record(InviteState::Invited)));
    service.push_fetch(Some(sample_record(InviteState::NotInvited)));
    let mut transitions = machine.subscribe();

    tokio::join!(
        machine.load("ev-1", "winter"),
        machine.refetch("ev-1", "winter"),
        async {
            // Permits go to waiters in arrival order: release the stale fetch
            // first, then the forced one.
            tokio::task::yield_now().await;
            service.open_gate(1);
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            service.open_gate(1);
        }
    );

    assert_eq!(service.fetch_count(), 2);
    assert!(matches!(machine.state(), DerivedState::NotInvited(_)));
    while let Ok(state) = transitions.try_recv() {
        assert!(!matches!(state, DerivedState::Invited(_)));
    }
}

#[tokio::test]
async fn test_shutdown_abandons_in_flight_fetch() {
    let (machine, service, _) =
        create_test_machine(MockInviteService::gated(), MockIdentityStore::new());
    service.push_fetch(Some(sample_record(InviteState::Invited)));

    let (state, _) = tokio::join!(machine.load("ev-1", "winter"), async {
        tokio::task::yield_now().await;
        machine.shutdown();
    });

    assert_eq!(state, DerivedState::Loading);
    assert_eq!(machine.state(), DerivedState::Loading);
    assert_eq!(service.fetch_count(), 1);
}

#[test]
fn test_derive_state_branches() {
    assert_eq!(derive_state(None, None), DerivedState::Error);
    assert_eq!(
        derive_state(Some(sample_record(InviteState::Invited)), None),
        DerivedState::Invited(sample_record(InviteState::Invited))
    );
    assert_eq!(
        derive_state(Some(sample_record(InviteState::NotInvited)), None),
        DerivedState::NotInvited(sample_record(InviteState::NotInvited))
    );
    assert_eq!(
        derive_state(
            Some(sample_record(InviteState::Confirming)),
            Some("guest@example.org".to_string())
        ),
        DerivedState::Confirming {
            record: sample_record(InviteState::Confirming),
            email: Some("guest@example.org".to_string()),
        }
    );
    assert!(matches!(
        derive_state(
            Some(sample_record(InviteState::Unrecognized("bogus".to_string()))),
            None
        ),
        DerivedState::Unknown(_)
    ));
}
