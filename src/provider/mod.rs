//! Streaming providers and the registry that resolves pasted URLs.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;

use crate::domain::track::Track;

pub mod fetch;
pub mod spotify;

use fetch::{FetchError, Fetcher, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Playlist,
    Album,
    Track,
}

impl ResourceKind {
    pub const ALL: &[ResourceKind] = &[
        ResourceKind::Playlist,
        ResourceKind::Album,
        ResourceKind::Track,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Playlist => "playlist",
            ResourceKind::Album => "album",
            ResourceKind::Track => "track",
        }
    }

    fn fetcher(&self) -> Fetcher {
        match self {
            ResourceKind::Playlist | ResourceKind::Album => fetch::fetch_collection,
            ResourceKind::Track => fetch::fetch_single,
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown resource kind: {s}"))
    }
}

/// A resolved URL: which provider, what kind of resource, and how to fetch it.
///
/// The API base is only given at fetch time.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    pub provider: &'static str,
    pub kind: ResourceKind,
    pub id: String,
    fetcher: Fetcher,
}

impl ResourceHandle {
    pub fn new(provider: &'static str, kind: ResourceKind, id: &str) -> Self {
        Self {
            provider,
            kind,
            id: id.to_string(),
            fetcher: kind.fetcher(),
        }
    }

    pub fn api_url(&self, api_base: &str) -> String {
        fetch::endpoint(api_base, self.provider, self.kind, &self.id)
    }

    pub fn fetch(&self, transport: &dyn Transport, api_base: &str) -> Result<Vec<Track>, FetchError> {
        (self.fetcher)(transport, api_base, self.provider, self.kind, &self.id)
    }
}

/// A streaming service whose URLs can be turned into resource handles.
pub trait Provider: Send + Sync {
    fn identifier(&self) -> &'static str;

    /// Icon file name served next to the widget assets
    fn icon(&self) -> &'static str;

    fn supported_kinds(&self) -> &'static [ResourceKind];

    /// Returns a handle if `url` is one of this provider's resource URLs.
    fn identify(&self, url: &str) -> Option<ResourceHandle>;
}

/// Ordered set of providers; the first one to recognize a URL wins.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(vec![Box::new(spotify::Spotify)])
    }
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    pub fn resolve(&self, url: &str) -> Option<ResourceHandle> {
        self.providers
            .iter()
            .find_map(|provider| provider.identify(url))
    }

    pub fn providers(&self) -> impl Iterator<Item = &dyn Provider> {
        self.providers.iter().map(|provider| provider.as_ref())
    }
}
