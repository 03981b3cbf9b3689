//! Exchange credential configuration page.

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::{info, warn};

use super::{escape, layout};
use crate::server::AppState;

/// Body returned after a successful save.
pub const CONFIG_SAVED: &str = "Configuration saved!";
/// Body returned when either field is blank.
pub const CONFIG_INCOMPLETE: &str = "Both api_key and secret_key are required";

/// `POST /config` form body. Missing fields are treated as empty.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ConfigForm {
    /// Exchange API key.
    pub api_key: String,
    /// Exchange secret key.
    pub secret_key: String,
}

impl std::fmt::Debug for ConfigForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigForm").finish_non_exhaustive()
    }
}

/// GET /config
pub async fn config_page(State(state): State<AppState>) -> Html<String> {
    let status = match state.credentials.api_key_hint() {
        Some(hint) => format!("Configured, API key {}", escape(&hint)),
        None => "Not configured".to_string(),
    };
    let body = format!(
        r#"
        <div class="card">
            <span class="card-title">Exchange API</span>
            <div class="muted" id="configStatus">{status}</div>
            <form method="post" action="/config">
                <label for="api_key">API key</label>
                <input id="api_key" name="api_key" autocomplete="off" required>
                <label for="secret_key">Secret key</label>
                <input id="secret_key" name="secret_key" type="password" autocomplete="off" required>
                <button class="btn" type="submit">Save</button>
            </form>
        </div>
"#
    );
    Html(layout("Configuration", &body, ""))
}

/// POST /config
///
/// Keys are held in memory only and are lost on restart.
pub async fn config_submit(State(state): State<AppState>, Form(form): Form<ConfigForm>) -> Response {
    match state.credentials.save(&form.api_key, &form.secret_key) {
        Ok(()) => {
            info!(
                api_key = state.credentials.api_key_hint().as_deref().unwrap_or_default(),
                "exchange credentials saved"
            );
            (StatusCode::OK, CONFIG_SAVED).into_response()
        }
        Err(e) => {
            warn!(error = %e, "rejected exchange credentials");
            (StatusCode::BAD_REQUEST, CONFIG_INCOMPLETE).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_keys() {
        let form = ConfigForm {
            api_key: "visible-key".into(),
            secret_key: "visible-secret".into(),
        };
        let debug = format!("{form:?}");
        assert!(!debug.contains("visible"));
    }
}
