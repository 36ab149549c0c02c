use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName};

use crate::render::MountPrefix;

use super::SharedState;

/// Where the dashboard is mounted, as seen by one request.
#[derive(Clone, Debug)]
pub struct MountSettings {
    /// Header a reverse proxy uses to announce the stripped prefix.
    pub header: HeaderName,
    /// Used when the header is absent or unusable.
    pub base_path: MountPrefix,
}

impl Default for MountSettings {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static("x-forwarded-prefix"),
            base_path: MountPrefix::root(),
        }
    }
}

impl MountSettings {
    pub fn resolve(&self, headers: &HeaderMap) -> MountPrefix {
        let Some(raw) = headers.get(&self.header) else {
            return self.base_path.clone();
        };
        match raw.to_str().ok().and_then(MountPrefix::parse) {
            Some(prefix) => prefix,
            None => {
                tracing::debug!(header = %self.header, "ignoring unusable mount prefix header");
                self.base_path.clone()
            }
        }
    }
}

/// Extractor resolving the request's [`MountPrefix`].
#[derive(Clone, Debug)]
pub struct RequestPrefix(pub MountPrefix);

#[async_trait]
impl FromRequestParts<SharedState> for RequestPrefix {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(state.mount.resolve(&parts.headers)))
    }
}
