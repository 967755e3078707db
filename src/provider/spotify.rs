use std::sync::LazyLock;

use regex::Regex;

use super::{Provider, ResourceHandle, ResourceKind};

pub const IDENTIFIER: &str = "spotify";

static RESOURCE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://open\.spotify\.com/(playlist|album|track)/([^?]+)")
        .expect("spotify url pattern is valid")
});

/// Spotify web player links: `https://open.spotify.com/{kind}/{id}[?...]`
pub struct Spotify;

impl Provider for Spotify {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn icon(&self) -> &'static str {
        "spotify.png"
    }

    fn supported_kinds(&self) -> &'static [ResourceKind] {
        ResourceKind::ALL
    }

    fn identify(&self, url: &str) -> Option<ResourceHandle> {
        let captures = RESOURCE_URL.captures(url)?;
        let kind = captures.get(1)?.as_str().parse().ok()?;
        let id = captures.get(2)?.as_str();
        Some(ResourceHandle::new(IDENTIFIER, kind, id))
    }
}
