//! Integration tests
//!
//! Shared fixtures and end-to-end tests through the HTTP router.

pub mod fixtures;

mod e2e;
