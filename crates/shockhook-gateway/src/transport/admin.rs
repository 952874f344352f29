//! Admin page and its two submit endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::Form;

use shockhook_core::error::Result;
use shockhook_core::policy::Policy;

use super::ApiError;
use crate::admin::{apply_pause_toggle, apply_policy_update, PauseForm, PolicyForm};
use crate::app_state::AppState;

const ADMIN_PATH: &str = "/admin";

pub async fn index(State(app): State<AppState>) -> std::result::Result<Html<String>, ApiError> {
    let policy = app.store().load();
    Ok(Html(app.admin_page().render(&policy)?))
}

pub async fn apply(
    State(app): State<AppState>,
    Form(form): Form<PolicyForm>,
) -> std::result::Result<Redirect, ApiError> {
    let result = app
        .store()
        .modify(move |current| apply_policy_update(current, &form))
        .await;
    record(&app, "apply", &result);
    result?;
    Ok(Redirect::to(ADMIN_PATH))
}

pub async fn pause(
    State(app): State<AppState>,
    Form(form): Form<PauseForm>,
) -> std::result::Result<Redirect, ApiError> {
    let paused = form.paused()?;
    tracing::info!(paused, "toggling pause");
    let result = app
        .store()
        .modify(move |current| Ok(apply_pause_toggle(current, paused)))
        .await;
    record(&app, "pause", &result);
    result?;
    Ok(Redirect::to(ADMIN_PATH))
}

fn record(app: &AppState, kind: &str, result: &Result<Arc<Policy>>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(kind, err = %e, "policy update rejected");
            e.client_code().as_str()
        }
    };
    app.metrics()
        .policy_updates
        .inc(&[("kind", kind), ("result", outcome)]);
}
