//! sw-daemon library target.
//!
//! Exposes the pass runner, router and state for integration tests.
//! The binary `main.rs` depends on this library target.

pub mod api_types;
pub mod pass;
pub mod routes;
pub mod state;
