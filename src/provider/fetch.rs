//! Fetch adapters for the metadata API.
//!
//! Collection endpoints (playlist, album) answer `{"tracks": [...]}`; the
//! track endpoint answers a single track. Both come back as a list so the
//! caller never has to tell them apart.

use std::time::Duration;

use thiserror::Error;

use crate::{
    config::ApiConfig,
    domain::track::{Track, TrackCollection},
    provider::ResourceKind,
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API responded with status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("unexpected API response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Blocking HTTP GET returning the body of a 2xx response.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Transport backed by `ureq`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &ApiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(config.connect_timeout_secs))
            .timeout_read(Duration::from_secs(config.read_timeout_secs))
            .build();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        match self.agent.get(url).call() {
            Ok(response) => response.into_string().map_err(|err| FetchError::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            }),
            Err(ureq::Error::Status(status, _)) => Err(FetchError::Status {
                status,
                url: url.to_string(),
            }),
            Err(err) => Err(FetchError::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

/// Signature shared by the adapters, so a resource handle can hold one.
pub type Fetcher = fn(&dyn Transport, &str, &str, ResourceKind, &str) -> Result<Vec<Track>, FetchError>;

/// `{api_base}/{provider}/{kind}/{id}`, without doubling a trailing slash.
pub fn endpoint(api_base: &str, provider: &str, kind: ResourceKind, id: &str) -> String {
    format!("{}/{provider}/{kind}/{id}", api_base.trim_end_matches('/'))
}

/// Adapter for playlist and album endpoints.
pub fn fetch_collection(
    transport: &dyn Transport,
    api_base: &str,
    provider: &str,
    kind: ResourceKind,
    id: &str,
) -> Result<Vec<Track>, FetchError> {
    let url = endpoint(api_base, provider, kind, id);
    let body = transport.get(&url)?;
    let collection: TrackCollection =
        serde_json::from_str(&body).map_err(|err| FetchError::Decode {
            url: url.clone(),
            reason: err.to_string(),
        })?;
    log::info!("{url} returned {} tracks", collection.tracks.len());
    Ok(collection.tracks)
}

/// Adapter for the single track endpoint.
pub fn fetch_single(
    transport: &dyn Transport,
    api_base: &str,
    provider: &str,
    kind: ResourceKind,
    id: &str,
) -> Result<Vec<Track>, FetchError> {
    let url = endpoint(api_base, provider, kind, id);
    let body = transport.get(&url)?;
    let track: Track = serde_json::from_str(&body).map_err(|err| FetchError::Decode {
        url: url.clone(),
        reason: err.to_string(),
    })?;
    Ok(vec![track])
}

#[cfg(test)]
pub mod testing {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use super::{FetchError, Transport};

    /// Serves canned bodies by url and records every request.
    #[derive(Default, Clone)]
    pub struct FakeTransport {
        responses: HashMap<String, Result<String, u16>>,
        pub requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeTransport {
        pub fn with_body(mut self, url: &str, body: &str) -> Self {
            self.responses.insert(url.to_string(), Ok(body.to_string()));
            self
        }

        pub fn with_status(mut self, url: &str, status: u16) -> Self {
            self.responses.insert(url.to_string(), Err(status));
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, url: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(FetchError::Status {
                    status: *status,
                    url: url.to_string(),
                }),
                None => Err(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }
}
