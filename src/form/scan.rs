//! Annotation pass over the form rows

use crate::{
    domain::hash::{IdentityToken, RowMark},
    form::{FieldNames, ROW_COUNTER_ATTRIBUTE, TRACK_HASH_ATTRIBUTE, TrackForm},
    reconcile::index::RowIndex,
};

/// Marks every fillable row with its current identity and ordinal,
/// and returns the index built from those marks.
///
/// A row is fillable when it holds an artist input named after the field
/// scheme and the form has all four inputs for that ordinal. Other rows are
/// left as they are and do not appear in the index.
///
/// Must run before each reconciliation, since the user may have edited
/// rows since the previous one.
pub fn scan(form: &mut TrackForm, names: &FieldNames) -> RowIndex {
    let mut index = RowIndex::default();

    for position in 0..form.rows.len() {
        let Some(ordinal) = form.rows[position]
            .inputs
            .iter()
            .filter_map(|input| names.artist_ordinal(&input.id))
            .last()
        else {
            continue;
        };

        let Some(fields) = form.read_fields(names, ordinal) else {
            log::debug!("row {ordinal} lacks some track inputs, skipping");
            continue;
        };

        let mark = if fields.artist.is_empty() || fields.title.is_empty() || fields.album.is_empty()
        {
            RowMark::Empty
        } else {
            RowMark::Track(IdentityToken::from_fields(&fields))
        };

        let row = &mut form.rows[position];
        row.set_attribute(TRACK_HASH_ATTRIBUTE, mark.to_attribute());
        row.set_attribute(ROW_COUNTER_ATTRIBUTE, ordinal.to_string());
        index.insert(ordinal, position, mark);
    }

    log::debug!(
        "scanned {} rows, {} empty",
        index.row_count(),
        index.empty_count()
    );
    index
}
