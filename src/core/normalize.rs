//! Provider response normalization.
//!
//! Xtream-style panels are loose about types: the same field arrives as
//! `"2"`, `2`, `null` or `""` depending on the panel build. Every lookup
//! here goes through [`field_text`] so numbers and strings read the same
//! and empty values count as absent.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use super::credentials::PlaylistCredentials;
use super::fetch_plan::AttemptFailure;
use super::models::{AccountProfile, AccountStatus, PlanTier, ProfileSource};

/// Device limit assumed when the provider omits or garbles it.
pub const DEFAULT_DEVICE_LIMIT: u32 = 1;

/// Separator between `Label: value` pairs in the observation summary.
pub const SUMMARY_SEPARATOR: &str = " | ";

/// Build a profile from an introspection body.
///
/// `credentials` fill in `username`/`password` only when the body lacks
/// them. `bouquets` come from the separate category lookup.
///
/// # Errors
///
/// Returns [`AttemptFailure::FieldMissing`] when the body has no
/// `user_info` object.
pub fn normalize(
    body: &Value,
    source: ProfileSource,
    credentials: &PlaylistCredentials,
    bouquets: Vec<String>,
) -> Result<AccountProfile, AttemptFailure> {
    let info = body
        .get("user_info")
        .and_then(Value::as_object)
        .ok_or(AttemptFailure::FieldMissing)?;

    let plan_tier = if field_text(info, "is_trial").as_deref() == Some("1") {
        PlanTier::Trial
    } else {
        PlanTier::Premium
    };

    let status = if field_text(info, "status").as_deref() == Some("Active") {
        AccountStatus::Active
    } else {
        AccountStatus::Inactive
    };

    let expires_at = field_text(info, "exp_date").and_then(|raw| epoch_to_date(&raw));

    let device_limit = field_text(info, "max_connections")
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_DEVICE_LIMIT);

    Ok(AccountProfile {
        username: field_text(info, "username").unwrap_or_else(|| credentials.username.clone()),
        password: field_text(info, "password").unwrap_or_else(|| credentials.password.clone()),
        plan_tier,
        status,
        expires_at,
        device_limit: Some(device_limit),
        bouquets,
        observation_summary: observation_summary(info),
        source,
    })
}

/// Audit line listing whichever raw fields the provider returned.
///
/// The raw `status` string is kept here because the profile collapses it
/// to Active/Inactive.
#[must_use]
pub fn observation_summary(info: &Map<String, Value>) -> String {
    const LABELS: [(&str, &str); 6] = [
        ("username", "Username"),
        ("password", "Password"),
        ("exp_date", "Expires"),
        ("max_connections", "Max connections"),
        ("active_cons", "Active connections"),
        ("status", "Status"),
    ];

    LABELS
        .iter()
        .filter_map(|(key, label)| {
            field_text(info, key).map(|value| {
                let rendered = match (*key, epoch_to_date(&value)) {
                    ("exp_date", Some(date)) => format!("{value} ({})", date.format("%Y-%m-%d")),
                    _ => value,
                };
                format!("{label}: {rendered}")
            })
        })
        .collect::<Vec<_>>()
        .join(SUMMARY_SEPARATOR)
}

/// Category names from a `get_live_categories` body, in provider order.
#[must_use]
pub fn parse_bouquets(body: &Value) -> Vec<String> {
    body.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_object())
                .filter_map(|item| field_text(item, "category_name"))
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Read a scalar field as text; `null`, `""` and containers are absent.
#[must_use]
pub fn field_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Unix-epoch seconds (as text) to a UTC calendar date.
#[must_use]
pub fn epoch_to_date(raw: &str) -> Option<NaiveDate> {
    let seconds = raw.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}
