//! In-memory model of the host page's tracklist form.
//!
//! A form is a list of rows; each row holds named inputs and annotation
//! attributes. Inputs are addressed by id across the whole form, the way
//! the page looks them up.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::track::TrackFields;

pub mod scan;

/// Row attribute holding the row's identity token or `"empty"`
pub const TRACK_HASH_ATTRIBUTE: &str = "data-row-track-hash";
/// Row attribute holding the row ordinal taken from its input ids
pub const ROW_COUNTER_ATTRIBUTE: &str = "data-row-counter";

pub const DEFAULT_FIELD_PREFIX: &str = "edit-tracks";

#[derive(Debug, Error)]
pub enum FormError {
    #[error("form file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed form snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input {0} not found in form")]
    MissingInput(String),

    #[error("no scanned row with ordinal {0}")]
    UnknownRow(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackForm {
    #[serde(default)]
    pub rows: Vec<FormRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRow {
    #[serde(default)]
    pub inputs: Vec<FormInput>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub id: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
}

/// Per-row input naming scheme: `{prefix}-{ordinal}-{field}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    prefix: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD_PREFIX)
    }
}

impl FieldNames {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub fn artist(&self, ordinal: usize) -> String {
        format!("{}-{ordinal}-artist", self.prefix)
    }

    pub fn title(&self, ordinal: usize) -> String {
        format!("{}-{ordinal}-title", self.prefix)
    }

    pub fn album(&self, ordinal: usize) -> String {
        format!("{}-{ordinal}-album", self.prefix)
    }

    pub fn new_track(&self, ordinal: usize) -> String {
        format!("{}-{ordinal}-newtrack", self.prefix)
    }

    /// Returns the ordinal if `id` names a row's artist input.
    pub fn artist_ordinal(&self, id: &str) -> Option<usize> {
        let digits = id
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix('-')?
            .strip_suffix("-artist")?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl TrackForm {
    pub fn load(path: &Path) -> Result<Self, FormError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), FormError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Builds a form of `count` blank rows using the given naming scheme.
    pub fn blank(names: &FieldNames, count: usize) -> Self {
        let rows = (0..count)
            .map(|ordinal| FormRow {
                inputs: vec![
                    FormInput::text(names.artist(ordinal), ""),
                    FormInput::text(names.title(ordinal), ""),
                    FormInput::text(names.album(ordinal), ""),
                    FormInput::checkbox(names.new_track(ordinal), false),
                ],
                attributes: BTreeMap::new(),
            })
            .collect();
        Self { rows }
    }

    pub fn input(&self, id: &str) -> Option<&FormInput> {
        self.rows
            .iter()
            .flat_map(|row| row.inputs.iter())
            .find(|input| input.id == id)
    }

    fn input_mut(&mut self, id: &str) -> Result<&mut FormInput, FormError> {
        self.rows
            .iter_mut()
            .flat_map(|row| row.inputs.iter_mut())
            .find(|input| input.id == id)
            .ok_or_else(|| FormError::MissingInput(id.to_string()))
    }

    /// Current field values of the row with the given ordinal,
    /// or `None` if any of its four inputs is missing.
    pub fn read_fields(&self, names: &FieldNames, ordinal: usize) -> Option<TrackFields> {
        Some(TrackFields {
            artist: self.input(&names.artist(ordinal))?.value.clone(),
            title: self.input(&names.title(ordinal))?.value.clone(),
            album: self.input(&names.album(ordinal))?.value.clone(),
            is_new: self.input(&names.new_track(ordinal))?.checked,
        })
    }

    pub fn write_fields(
        &mut self,
        names: &FieldNames,
        ordinal: usize,
        fields: &TrackFields,
    ) -> Result<(), FormError> {
        self.input_mut(&names.artist(ordinal))?.value = fields.artist.clone();
        self.input_mut(&names.title(ordinal))?.value = fields.title.clone();
        self.input_mut(&names.album(ordinal))?.value = fields.album.clone();
        self.input_mut(&names.new_track(ordinal))?.checked = fields.is_new;
        Ok(())
    }
}

impl FormRow {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: String) {
        self.attributes.insert(name.to_string(), value);
    }
}

impl FormInput {
    pub fn text(id: String, value: &str) -> Self {
        Self {
            id,
            value: value.to_string(),
            checked: false,
        }
    }

    pub fn checkbox(id: String, checked: bool) -> Self {
        Self {
            id,
            value: String::new(),
            checked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn artist_ordinal_parses_only_artist_ids() {
        let names = FieldNames::default();

        assert_eq!(names.artist_ordinal("edit-tracks-12-artist"), Some(12));
        assert_eq!(names.artist_ordinal("edit-tracks-0-artist"), Some(0));
        assert_eq!(names.artist_ordinal("edit-tracks-3-title"), None);
        assert_eq!(names.artist_ordinal("edit-tracks--artist"), None);
        assert_eq!(names.artist_ordinal("edit-tracks-1a-artist"), None);
        assert_eq!(names.artist_ordinal("other-1-artist"), None);
    }

    #[test]
    fn write_then_read_fields() -> anyhow::Result<()> {
        let names = FieldNames::default();
        let mut form = TrackForm::blank(&names, 2);
        let fields = TrackFields {
            artist: "A".into(),
            title: "T".into(),
            album: "Alb".into(),
            is_new: true,
        };

        form.write_fields(&names, 1, &fields)?;

        assert_eq!(form.read_fields(&names, 1), Some(fields));
        assert_eq!(form.input("edit-tracks-0-artist").map(|i| i.value.as_str()), Some(""));
        Ok(())
    }

    #[test]
    fn write_fields_reports_missing_input() {
        let names = FieldNames::default();
        let mut form = TrackForm::blank(&names, 1);
        let fields = TrackFields {
            artist: "A".into(),
            title: "T".into(),
            album: "Alb".into(),
            is_new: false,
        };

        let err = form.write_fields(&names, 5, &fields).unwrap_err();
        assert!(matches!(err, FormError::MissingInput(id) if id == "edit-tracks-5-artist"));
    }

    #[test]
    fn parse_form_snapshot_json() -> anyhow::Result<()> {
        let json = r#"
{
  "rows": [
    {
      "inputs": [
        {"id": "edit-tracks-0-artist", "value": "A"},
        {"id": "edit-tracks-0-newtrack", "checked": true}
      ]
    },
    {}
  ]
}
"#;
        let form: TrackForm = serde_json::from_str(json)?;

        assert_eq!(form.rows.len(), 2);
        assert!(form.rows[1].inputs.is_empty());
        assert!(form.input("edit-tracks-0-newtrack").is_some_and(|i| i.checked));
        Ok(())
    }

    #[test]
    fn save_and_load_snapshot() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("form.json");
        let mut form = TrackForm::blank(&FieldNames::default(), 3);
        form.rows[0].set_attribute(TRACK_HASH_ATTRIBUTE, "empty".to_string());

        form.save(&path)?;
        let loaded = TrackForm::load(&path)?;

        assert_eq!(loaded, form);
        Ok(())
    }
}
