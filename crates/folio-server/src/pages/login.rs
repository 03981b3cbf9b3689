//! Login page.

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::{info, warn};

use super::layout;
use crate::server::AppState;

/// Body returned when the credentials do not match.
pub const LOGIN_FAILED: &str = "Login failed!";

const TEMPLATE: &str = r#"
        <div class="card">
            <span class="card-title">Sign in</span>
            <form method="post" action="/login">
                <label for="username">Username</label>
                <input id="username" name="username" autocomplete="username" required>
                <label for="password">Password</label>
                <input id="password" name="password" type="password" autocomplete="current-password" required>
                <button class="btn" type="submit">Log in</button>
            </form>
        </div>
"#;

/// `POST /login` form body. Missing fields are treated as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    /// Submitted username.
    pub username: String,
    /// Submitted password.
    pub password: String,
}

/// GET /login
pub async fn login_page() -> Html<String> {
    Html(layout("Login", TEMPLATE, ""))
}

/// POST /login
///
/// Redirects to the dashboard when the pair matches the configured
/// credentials. There is no session: the redirect is the whole effect.
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if form.username == state.auth.username && form.password == state.auth.password {
        info!(username = %form.username, "login succeeded");
        Redirect::to("/").into_response()
    } else {
        warn!(username = %form.username, "login failed");
        (StatusCode::OK, LOGIN_FAILED).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn form_posts_username_and_password() {
        let Html(html) = login_page().await;
        assert!(html.contains("action=\"/login\""));
        assert!(html.contains("name=\"username\""));
        assert!(html.contains("name=\"password\""));
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let form: LoginForm = serde_json::from_str("{}").unwrap();
        assert!(form.username.is_empty());
        assert!(form.password.is_empty());
    }
}
