//! Invite lifecycle derivation and the visitor's invite submission flow.

pub mod errors;
pub mod state;
pub mod submission;

pub use state::{derive_state, DerivedState, InviteStateMachine};
pub use submission::SubmissionController;

#[cfg(test)]
mod tests;
