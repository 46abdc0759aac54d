//! Integration tests for Sluice
//!
//! These tests drive the real router end to end over temporary files,
//! verifying the delivery contract at the HTTP boundary: status codes,
//! headers, and byte-exact bodies.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/delivery_flow.rs"]
mod delivery_flow;

#[path = "integration/offload_dispatch.rs"]
mod offload_dispatch;

#[path = "integration/outcome_contract.rs"]
mod outcome_contract;

#[path = "integration/path_boundaries.rs"]
mod path_boundaries;

#[path = "integration/range_properties.rs"]
mod range_properties;
