use serde::{Deserialize, Serialize};

/// Album label shown for tracks the provider reports as singles.
pub const SINGLE_ALBUM_LABEL: &str = "Single";

/// A track as returned by the metadata API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub artist: String,
    #[serde(rename = "track", alias = "title")]
    pub title: String,
    pub album: String,
    #[serde(rename = "isNew", default)]
    pub is_new: bool,
    #[serde(rename = "isSingle", default)]
    pub is_single: bool,
}

impl Track {
    #[cfg(test)]
    pub fn new(artist: &str, title: &str, album: &str) -> Self {
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
            album: album.to_string(),
            is_new: false,
            is_single: false,
        }
    }

    /// Album value written into the form
    pub fn display_album(&self) -> &str {
        if self.is_single {
            SINGLE_ALBUM_LABEL
        } else {
            &self.album
        }
    }

    /// The fields a form row shows for this track.
    pub fn fields(&self) -> TrackFields {
        TrackFields {
            artist: self.artist.clone(),
            title: self.title.clone(),
            album: self.display_album().to_string(),
            is_new: self.is_new,
        }
    }
}

/// The identity-bearing subset of a track: what a form row can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackFields {
    pub artist: String,
    #[serde(rename = "track")]
    pub title: String,
    pub album: String,
    #[serde(rename = "isNew")]
    pub is_new: bool,
}

/// Payload of the playlist and album endpoints.
#[derive(Debug, Deserialize)]
pub struct TrackCollection {
    #[serde(alias = "Tracks")]
    pub tracks: Vec<Track>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_substitutes_album_label() {
        let mut track = Track::new("A", "T", "Some Album");
        track.is_single = true;

        assert_eq!(track.display_album(), SINGLE_ALBUM_LABEL);
        assert_eq!(track.fields().album, "Single");
    }

    #[test]
    fn parse_api_track_json() -> anyhow::Result<()> {
        let json = r#"{"artist":"A","track":"T","album":"Alb","isNew":true,"isSingle":false}"#;
        let track: Track = serde_json::from_str(json)?;

        assert_eq!(track.title, "T");
        assert!(track.is_new);
        assert!(!track.is_single);
        Ok(())
    }

    #[test]
    fn title_key_is_accepted_for_track_name() -> anyhow::Result<()> {
        let json = r#"{"artist":"A","title":"T","album":"Alb","isNew":false,"isSingle":false}"#;
        let track: Track = serde_json::from_str(json)?;

        assert_eq!(track, Track::new("A", "T", "Alb"));
        Ok(())
    }

    #[test]
    fn collection_without_tracks_key_is_rejected() {
        assert!(serde_json::from_str::<TrackCollection>("{}").is_err());
        assert!(serde_json::from_str::<TrackCollection>(r#"{"error":"not found"}"#).is_err());
    }

    #[test]
    fn collection_accepts_capitalized_tracks_key() -> anyhow::Result<()> {
        let json = r#"{"Tracks":[{"artist":"A","track":"T","album":"Alb"}],"PlaylistId":"p1"}"#;
        let collection: TrackCollection = serde_json::from_str(json)?;

        assert_eq!(collection.tracks, vec![Track::new("A", "T", "Alb")]);
        Ok(())
    }

    #[test]
    fn missing_flags_default_to_false() -> anyhow::Result<()> {
        let json = r#"{"artist":"A","track":"T","album":"Alb"}"#;
        let track: Track = serde_json::from_str(json)?;

        assert!(!track.is_new);
        assert!(!track.is_single);
        Ok(())
    }
}
