//! m3ui - IPTV playlist credential and account metadata extraction.
//!
//! Parses an Xtream-style playlist URL, queries the provider's account
//! endpoint directly or through CORS relay proxies, and normalizes the
//! answer into an [`core::AccountProfile`]. When nothing answers, a
//! simulated profile is returned instead of an error.

// Note: deny (not forbid) to allow #[allow(unsafe_code)] in test helpers for env var manipulation
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod core;
pub mod error;
pub mod render;
pub mod storage;
pub mod util;

/// Test utilities module - included in test builds or when test-utils feature is enabled.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{ExitCode, ExtractError, M3uiError, Result};

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::*;
