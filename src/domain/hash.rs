use std::fmt::Display;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::json;

use super::track::TrackFields;

/// Attribute value marking a row that holds no complete track.
pub const EMPTY_MARK: &str = "empty";

/// Represents the identity of a track in the tracklist form.
///
/// Two tracks with the same artist, title, album and new flag get the same
/// token; any difference in those fields gives a different one.
/// The token is the unpadded url-safe base64 of a canonical JSON object,
/// so it only contains `[A-Za-z0-9_-]` and can be decoded back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn from_fields(fields: &TrackFields) -> Self {
        // serde_json object keys are kept sorted, which fixes the order
        let canonical = json!({
            "artist": fields.artist,
            "track": fields.title,
            "album": fields.album,
            "isNew": fields.is_new,
        })
        .to_string();
        log::debug!(
            "hashing with {}: {} ({}){}",
            fields.artist,
            fields.title,
            fields.album,
            if fields.is_new { " [new]" } else { "" }
        );
        Self(URL_SAFE_NO_PAD.encode(canonical.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recovers the fields the token was computed from.
    pub fn decode(&self) -> anyhow::Result<TrackFields> {
        let bytes = URL_SAFE_NO_PAD.decode(&self.0)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Display for IdentityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a scanned row carries: either a track identity or nothing.
///
/// `Empty` is a separate variant, so no track can ever be mistaken for it.
/// Its attribute form `"empty"` has length 5, which unpadded base64 never
/// produces (length mod 4 is never 1).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowMark {
    Empty,
    Track(IdentityToken),
}

impl RowMark {
    pub fn to_attribute(&self) -> String {
        match self {
            RowMark::Empty => EMPTY_MARK.to_string(),
            RowMark::Track(token) => token.as_str().to_string(),
        }
    }

    pub fn from_attribute(value: &str) -> Self {
        if value == EMPTY_MARK {
            RowMark::Empty
        } else {
            RowMark::Track(IdentityToken(value.to_string()))
        }
    }
}
