//! Renders the admin form pre-filled with the current policy.

use std::time::Duration;

use handlebars::Handlebars;
use serde::Serialize;

use shockhook_core::error::{Result, ShockhookError};
use shockhook_core::policy::{Policy, MAX_DURATION, MAX_INTENSITY, MIN_DURATION, MIN_INTENSITY};

use super::mutator::format_rooms;

const TEMPLATE_NAME: &str = "admin";
const TEMPLATE: &str = include_str!("../../templates/admin.hbs");

pub struct AdminPage {
    registry: Handlebars<'static>,
}

/// Template context. Time spans are shown in seconds, like the form expects them.
#[derive(Debug, Serialize)]
struct PolicyView {
    paused: bool,
    intensity: u8,
    duration: String,
    rate_interval: String,
    rate_burst: u32,
    allow_shock: bool,
    allow_vibrate: bool,
    allowed_rooms: String,
    min_intensity: u8,
    max_intensity: u8,
    min_duration: String,
    max_duration: String,
}

impl From<&Policy> for PolicyView {
    fn from(p: &Policy) -> Self {
        Self {
            paused: p.paused,
            intensity: p.intensity,
            duration: format_secs(p.duration),
            rate_interval: format_secs(p.rate_interval),
            rate_burst: p.rate_burst,
            allow_shock: p.allow_shock,
            allow_vibrate: p.allow_vibrate,
            allowed_rooms: format_rooms(p.allowed_rooms.as_ref()),
            min_intensity: MIN_INTENSITY,
            max_intensity: MAX_INTENSITY,
            min_duration: format_secs(MIN_DURATION),
            max_duration: format_secs(MAX_DURATION),
        }
    }
}

impl AdminPage {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry
            .register_template_string(TEMPLATE_NAME, TEMPLATE)
            .map_err(|e| ShockhookError::Internal(format!("admin template invalid: {e}")))?;
        Ok(Self { registry })
    }

    pub fn render(&self, policy: &Policy) -> Result<String> {
        self.registry
            .render(TEMPLATE_NAME, &PolicyView::from(policy))
            .map_err(|e| ShockhookError::Internal(format!("render admin page failed: {e}")))
    }
}

/// Seconds with at most millisecond precision and no trailing zeros.
fn format_secs(d: Duration) -> String {
    let s = format!("{:.3}", d.as_secs_f64());
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
