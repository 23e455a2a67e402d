mod state_machine_test;

use std::sync::Arc;

use laurentia_shared::test_utils::test_logging::init_test_logging;
use laurentia_shared::test_utils::{MockIdentityStore, MockInviteService};

use crate::state::InviteStateMachine;

pub(crate) type TestMachine = InviteStateMachine<MockInviteService, MockIdentityStore>;

pub(crate) fn create_test_machine(
    service: MockInviteService,
    store: MockIdentityStore,
) -> (Arc<TestMachine>, Arc<MockInviteService>, Arc<MockIdentityStore>) {
    init_test_logging();
    let service = Arc::new(service);
    let store = Arc::new(store);
    let machine = Arc::new(InviteStateMachine::new(service.clone(), store.clone()));
    (machine, service, store)
}
