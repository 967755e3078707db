//! Assigns fetched tracks to the form's free rows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{
        hash::{IdentityToken, RowMark},
        track::Track,
    },
    form::{FieldNames, FormError, TRACK_HASH_ATTRIBUTE, TrackForm, scan::scan},
};

pub mod index;

use index::RowIndex;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("more than one row carries the same track: rows {rows:?}")]
    MultipleRowsWithSameToken { rows: Vec<usize> },

    #[error("row {0} is not empty")]
    RowNotEmpty(usize),

    #[error(transparent)]
    Form(#[from] FormError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    Success,
    Duplicate,
    NoFreeRow,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillCounts {
    pub success: usize,
    pub duplicate: usize,
    #[serde(rename = "noFreeRow")]
    pub no_free_row: usize,
}

impl FillCounts {
    pub fn record(&mut self, outcome: FillOutcome) {
        match outcome {
            FillOutcome::Success => self.success += 1,
            FillOutcome::Duplicate => self.duplicate += 1,
            FillOutcome::NoFreeRow => self.no_free_row += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.duplicate + self.no_free_row
    }
}

/// Scans the form and assigns `tracks` to it in one pass.
pub fn reconcile(
    form: &mut TrackForm,
    names: &FieldNames,
    tracks: &[Track],
) -> Result<FillCounts, ReconcileError> {
    let mut index = scan(form, names);
    assign(form, names, &mut index, tracks)
}

/// Assigns each track, in order, to the lowest free row unless a row
/// already holds the same track.
pub fn assign(
    form: &mut TrackForm,
    names: &FieldNames,
    index: &mut RowIndex,
    tracks: &[Track],
) -> Result<FillCounts, ReconcileError> {
    let mut counts = FillCounts::default();
    for track in tracks {
        counts.record(fill_row(form, names, index, track)?);
    }
    debug_assert_eq!(counts.total(), tracks.len());
    Ok(counts)
}

fn fill_row(
    form: &mut TrackForm,
    names: &FieldNames,
    index: &mut RowIndex,
    track: &Track,
) -> Result<FillOutcome, ReconcileError> {
    let fields = track.fields();
    let token = IdentityToken::from_fields(&fields);

    if index.rows_with(&token).is_some() {
        log::debug!(
            "skipping duplicate '{}': '{}'",
            fields.artist,
            fields.title
        );
        return Ok(FillOutcome::Duplicate);
    }

    let Some(ordinal) = index.first_empty() else {
        log::debug!(
            "no rows available for '{}': '{}'",
            fields.artist,
            fields.title
        );
        return Ok(FillOutcome::NoFreeRow);
    };
    let position = index.position(ordinal).ok_or(FormError::UnknownRow(ordinal))?;

    form.write_fields(names, ordinal, &fields)?;
    if let Some(row) = form.rows.get_mut(position) {
        row.set_attribute(
            TRACK_HASH_ATTRIBUTE,
            RowMark::Track(token.clone()).to_attribute(),
        );
    }
    index.claim(ordinal, token)?;

    Ok(FillOutcome::Success)
}
