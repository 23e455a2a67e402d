//! Shared building blocks for the Laurentia invite client: the canonical
//! invitation model, the wire envelopes, the remote invite client, and the
//! visitor identity store.

pub mod config;
pub mod errors;
pub mod models;
pub mod remote;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
