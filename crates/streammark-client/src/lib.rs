//! HTTP persistence client for StreamMark.
//!
//! Implements the core's [`RemoteStore`] contract against the REST backend
//! (`streammark-server` or any API-compatible service). Calls are blocking:
//! drive them from a dedicated worker thread, not from the thread handling
//! pointer input.

use std::time::Duration;

use serde::Deserialize;
use streammark_core::{
    BoxFuture, Overlay, OverlayDraft, OverlayId, OverlayPatch, RemoteError, RemoteResult,
    RemoteStore, StreamSettings,
};
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create an HTTP agent configured with native-tls.
///
/// Native-tls uses the system's TLS library and the platform's built-in
/// root certificates, which behaves better in constrained environments.
fn agent(timeout: Duration) -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Wire envelope for a single overlay.
#[derive(Debug, Deserialize)]
struct OverlayEnvelope {
    overlay: Overlay,
}

/// Wire envelope for the overlay listing.
#[derive(Debug, Deserialize)]
struct OverlayListEnvelope {
    overlays: Vec<Overlay>,
}

/// Wire envelope for the stream settings.
#[derive(Debug, Deserialize)]
struct SettingsEnvelope {
    settings: StreamSettings,
}

/// Map a transport-level failure onto the core's error taxonomy.
///
/// `id` is the overlay the request referenced, if any; a 404 without one is
/// an API mismatch rather than a missing entity.
fn map_error(id: Option<OverlayId>, err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::StatusCode(404) => match id {
            Some(id) => RemoteError::NotFound(id),
            None => RemoteError::Transport("unexpected 404 from backend".to_string()),
        },
        ureq::Error::StatusCode(400) => {
            RemoteError::Validation("request rejected by backend".to_string())
        }
        other => RemoteError::Transport(other.to_string()),
    }
}

/// Blocking HTTP implementation of [`RemoteStore`].
pub struct HttpRemote {
    agent: Agent,
    base_url: String,
}

impl HttpRemote {
    /// Create a client for the given base URL (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            agent: agent(timeout),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn overlay_url(&self, id: OverlayId) -> String {
        format!("{}/api/overlays/{}", self.base_url, id)
    }
}

impl RemoteStore for HttpRemote {
    fn list_overlays(&self) -> BoxFuture<'_, RemoteResult<Vec<Overlay>>> {
        Box::pin(async move {
            log::debug!("GET {}", self.url("/api/overlays"));
            let mut response = self
                .agent
                .get(self.url("/api/overlays"))
                .call()
                .map_err(|e| map_error(None, e))?;
            let envelope: OverlayListEnvelope = response
                .body_mut()
                .read_json()
                .map_err(|e| RemoteError::Transport(e.to_string()))?;
            Ok(envelope.overlays)
        })
    }

    fn create_overlay(&self, draft: OverlayDraft) -> BoxFuture<'_, RemoteResult<Overlay>> {
        Box::pin(async move {
            let mut response = self
                .agent
                .post(self.url("/api/overlays"))
                .send_json(&draft)
                .map_err(|e| map_error(None, e))?;
            let envelope: OverlayEnvelope = response
                .body_mut()
                .read_json()
                .map_err(|e| RemoteError::Transport(e.to_string()))?;
            Ok(envelope.overlay)
        })
    }

    fn update_overlay(
        &self,
        id: OverlayId,
        patch: OverlayPatch,
    ) -> BoxFuture<'_, RemoteResult<Overlay>> {
        Box::pin(async move {
            let mut response = self
                .agent
                .put(self.overlay_url(id))
                .send_json(&patch)
                .map_err(|e| map_error(Some(id), e))?;
            let envelope: OverlayEnvelope = response
                .body_mut()
                .read_json()
                .map_err(|e| RemoteError::Transport(e.to_string()))?;
            Ok(envelope.overlay)
        })
    }

    fn delete_overlay(&self, id: OverlayId) -> BoxFuture<'_, RemoteResult<()>> {
        Box::pin(async move {
            self.agent
                .delete(self.overlay_url(id))
                .call()
                .map_err(|e| map_error(Some(id), e))?;
            Ok(())
        })
    }

    fn get_settings(&self) -> BoxFuture<'_, RemoteResult<StreamSettings>> {
        Box::pin(async move {
            let mut response = self
                .agent
                .get(self.url("/api/settings"))
                .call()
                .map_err(|e| map_error(None, e))?;
            let envelope: SettingsEnvelope = response
                .body_mut()
                .read_json()
                .map_err(|e| RemoteError::Transport(e.to_string()))?;
            Ok(envelope.settings)
        })
    }

    fn put_settings(&self, settings: StreamSettings) -> BoxFuture<'_, RemoteResult<()>> {
        Box::pin(async move {
            self.agent
                .put(self.url("/api/settings"))
                .send_json(&settings)
                .map_err(|e| map_error(None, e))?;
            Ok(())
        })
    }
}
