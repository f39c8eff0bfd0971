//! Shared helpers for integration tests.
//!
//! - `fixtures`: wiremock provider/relay setup and canned bodies
//! - `logger`: phase-aware test logging

pub mod fixtures;
pub mod logger;
