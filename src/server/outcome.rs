use std::fmt::Display;
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::render::{MountPrefix, ViewContext};

use super::AppState;

pub const ROOT: &str = "/";

/// What a handler decided to send back. Failures are expressed as a
/// `Redirect`, never as an error page.
#[derive(Debug)]
pub enum Outcome {
    View {
        name: &'static str,
        context: ViewContext,
    },
    Redirect(String),
}

impl Outcome {
    pub fn view(name: &'static str, context: ViewContext) -> Self {
        Self::View { name, context }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(location.into())
    }
}

/// Handler bodies return `Result<Outcome, Outcome>` so `?` can bail out with
/// a redirect.
pub type HandlerResult = Result<Outcome, Outcome>;

pub trait OrRedirect<T> {
    /// Logs the failure and turns it into a redirect to `location`.
    fn or_redirect(self, location: &str, what: &'static str) -> Result<T, Outcome>;
}

impl<T, E: Display> OrRedirect<T> for Result<T, E> {
    fn or_redirect(self, location: &str, what: &'static str) -> Result<T, Outcome> {
        self.map_err(|e| {
            tracing::warn!(operation = what, error = %e, location, "request failed, redirecting");
            Outcome::redirect(location)
        })
    }
}

pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Renders a view off the async runtime (templates may be re-read from disk)
/// and falls back to a redirect to `/` if anything goes wrong.
pub async fn respond(state: Arc<AppState>, prefix: MountPrefix, result: HandlerResult) -> Response {
    let (name, context) = match result.unwrap_or_else(|fallback| fallback) {
        Outcome::Redirect(location) => return found(&location),
        Outcome::View { name, context } => (name, context),
    };

    let rendered =
        tokio::task::spawn_blocking(move || state.renderer.render(name, context, &prefix)).await;

    match rendered {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(e)) => {
            tracing::error!(view = name, error = %e, "template render failed");
            found(ROOT)
        }
        Err(e) => {
            tracing::error!(view = name, error = %e, "render task failed");
            found(ROOT)
        }
    }
}
