//! Admin form validation. Builds the next policy snapshot from raw form input.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;

use shockhook_core::error::{Result, ShockhookError};
use shockhook_core::policy::{Policy, MAX_DURATION, MAX_INTENSITY, MIN_DURATION, MIN_INTENSITY};

/// Wildcard accepted in the room list for "every room".
pub const ALL_ROOMS: &str = "*";

/// Raw policy form. Time spans are in seconds; checkboxes are absent when unticked.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyForm {
    pub intensity: Option<String>,
    pub duration: Option<String>,
    pub rate_interval: Option<String>,
    pub rate_burst: Option<String>,
    pub allow_shock: Option<String>,
    pub allow_vibrate: Option<String>,
    pub allowed_rooms: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PauseForm {
    pub paused: Option<String>,
}

impl PauseForm {
    pub fn paused(&self) -> Result<bool> {
        parse_flag("paused", self.paused.as_deref())
    }
}

/// Validate a full policy form against the committed policy.
///
/// Everything except `paused` comes from the form; the pause flag is owned by
/// the pause toggle and carried over from `current`.
pub fn apply_policy_update(current: &Policy, form: &PolicyForm) -> Result<Policy> {
    let intensity: u8 = parse_number("intensity", required("intensity", &form.intensity)?)?;
    if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&intensity) {
        return Err(invalid(format!(
            "intensity must be between {MIN_INTENSITY} and {MAX_INTENSITY}"
        )));
    }

    let duration = parse_seconds("duration", required("duration", &form.duration)?)?;
    if !(MIN_DURATION..=MAX_DURATION).contains(&duration) {
        return Err(invalid(format!(
            "duration must be between {}s and {}s",
            MIN_DURATION.as_secs_f64(),
            MAX_DURATION.as_secs_f64()
        )));
    }

    let rate_interval =
        parse_seconds("rate_interval", required("rate_interval", &form.rate_interval)?)?;
    if rate_interval.is_zero() {
        return Err(invalid("rate_interval must be positive"));
    }

    let rate_burst: u32 = parse_number("rate_burst", required("rate_burst", &form.rate_burst)?)?;

    Ok(Policy {
        paused: current.paused,
        intensity,
        duration,
        rate_interval,
        rate_burst,
        allow_shock: parse_flag("allow_shock", form.allow_shock.as_deref())?,
        allow_vibrate: parse_flag("allow_vibrate", form.allow_vibrate.as_deref())?,
        allowed_rooms: parse_rooms(form.allowed_rooms.as_deref().unwrap_or_default()),
    })
}

/// Copy `current` with only the pause flag changed.
pub fn apply_pause_toggle(current: &Policy, paused: bool) -> Policy {
    current.with_paused(paused)
}

/// `*` means every room, blank means none, otherwise one room per line.
pub fn parse_rooms(raw: &str) -> Option<BTreeSet<String>> {
    let raw = raw.trim();
    if raw == ALL_ROOMS {
        return None;
    }
    Some(
        raw.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

/// Inverse of `parse_rooms`, for pre-filling the form.
pub fn format_rooms(rooms: Option<&BTreeSet<String>>) -> String {
    match rooms {
        None => ALL_ROOMS.to_string(),
        Some(set) => set.iter().map(String::as_str).collect::<Vec<_>>().join("\n"),
    }
}

fn invalid(msg: impl Into<String>) -> ShockhookError {
    ShockhookError::Validation(msg.into())
}

fn required<'a>(name: &str, v: &'a Option<String>) -> Result<&'a str> {
    match v.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(invalid(format!("{name} is required"))),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| invalid(format!("{name} must be a non-negative integer in range, got {raw:?}")))
}

fn parse_seconds(name: &str, raw: &str) -> Result<Duration> {
    let secs: f64 = raw
        .parse()
        .map_err(|_| invalid(format!("{name} must be a number of seconds, got {raw:?}")))?;
    // u64 millis overflow guard
    if !secs.is_finite() || !(0.0..1e12).contains(&secs) {
        return Err(invalid(format!("{name} out of range: {raw}")));
    }
    Ok(Duration::from_millis((secs * 1000.0).round() as u64))
}

fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool> {
    match raw.map(str::trim) {
        None | Some("") | Some("false") | Some("off") | Some("0") => Ok(false),
        Some("true") | Some("on") | Some("1") => Ok(true),
        Some(other) => Err(invalid(format!("{name} must be a checkbox value, got {other:?}"))),
    }
}
