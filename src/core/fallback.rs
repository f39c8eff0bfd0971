//! Placeholder profile when no strategy reached the provider.
//!
//! Lets the operator continue with manual data entry: the credentials are
//! known from the URL, everything else is a fixed default.

use super::credentials::PlaylistCredentials;
use super::models::{AccountProfile, AccountStatus, PlanTier, ProfileSource};
use super::normalize::{DEFAULT_DEVICE_LIMIT, SUMMARY_SEPARATOR};

/// Build the simulated profile for `credentials`. Deterministic.
#[must_use]
pub fn synthesize(credentials: &PlaylistCredentials) -> AccountProfile {
    let observation_summary = [
        format!("Username: {}", credentials.username),
        format!("Password: {}", credentials.password),
        "Simulated data: provider could not be reached".to_string(),
    ]
    .join(SUMMARY_SEPARATOR);

    AccountProfile {
        username: credentials.username.clone(),
        password: credentials.password.clone(),
        plan_tier: PlanTier::Premium,
        status: AccountStatus::Active,
        expires_at: None,
        device_limit: Some(DEFAULT_DEVICE_LIMIT),
        bouquets: Vec::new(),
        observation_summary,
        source: ProfileSource::Simulated,
    }
}
