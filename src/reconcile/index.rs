use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    domain::hash::{IdentityToken, RowMark},
    reconcile::ReconcileError,
};

/// Which rows carry which identity, as of the last scan.
///
/// Row ordinals are the ones recorded by the scan; `positions` maps them
/// back to the row's place in the form.
#[derive(Debug, Default)]
pub struct RowIndex {
    tracks: HashMap<IdentityToken, BTreeSet<usize>>,
    empty: BTreeSet<usize>,
    positions: BTreeMap<usize, usize>,
}

impl RowIndex {
    pub fn insert(&mut self, ordinal: usize, position: usize, mark: RowMark) {
        self.positions.insert(ordinal, position);
        match mark {
            RowMark::Empty => {
                self.empty.insert(ordinal);
            }
            RowMark::Track(token) => {
                self.tracks.entry(token).or_default().insert(ordinal);
            }
        }
    }

    /// Ordinals of the rows currently holding `token`.
    pub fn rows_with(&self, token: &IdentityToken) -> Option<&BTreeSet<usize>> {
        self.tracks.get(token).filter(|rows| !rows.is_empty())
    }

    /// Lowest empty ordinal
    pub fn first_empty(&self) -> Option<usize> {
        self.empty.first().copied()
    }

    pub fn position(&self, ordinal: usize) -> Option<usize> {
        self.positions.get(&ordinal).copied()
    }

    /// Moves an empty row over to `token` once a track has been written to it.
    ///
    /// Callers check `rows_with` first, so both errors mean the index and the
    /// form have drifted apart. Rows the user filled with the same track by
    /// hand are indexed by `insert` and never pass through here.
    pub fn claim(&mut self, ordinal: usize, token: IdentityToken) -> Result<(), ReconcileError> {
        if !self.empty.remove(&ordinal) {
            return Err(ReconcileError::RowNotEmpty(ordinal));
        }
        let rows = self.tracks.entry(token).or_default();
        rows.insert(ordinal);
        if rows.len() > 1 {
            return Err(ReconcileError::MultipleRowsWithSameToken {
                rows: rows.iter().copied().collect(),
            });
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.positions.len()
    }

    pub fn empty_count(&self) -> usize {
        self.empty.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::track::Track;

    fn token(title: &str) -> IdentityToken {
        IdentityToken::from_fields(&Track::new("A", title, "Alb").fields())
    }

    #[test]
    fn first_empty_is_lowest_ordinal() {
        let mut index = RowIndex::default();
        index.insert(4, 0, RowMark::Empty);
        index.insert(2, 1, RowMark::Empty);
        index.insert(0, 2, RowMark::Track(token("T")));

        assert_eq!(index.first_empty(), Some(2));
        assert_eq!(index.position(2), Some(1));
    }

    #[test]
    fn claim_moves_row_out_of_empty_pool() -> anyhow::Result<()> {
        let mut index = RowIndex::default();
        index.insert(0, 0, RowMark::Empty);
        index.insert(1, 1, RowMark::Empty);

        index.claim(0, token("T"))?;

        assert_eq!(index.first_empty(), Some(1));
        assert!(index.rows_with(&token("T")).is_some_and(|rows| rows.contains(&0)));
        Ok(())
    }

    #[test]
    fn claim_rejects_second_row_for_same_token() -> anyhow::Result<()> {
        let mut index = RowIndex::default();
        index.insert(0, 0, RowMark::Empty);
        index.insert(1, 1, RowMark::Empty);
        index.claim(0, token("T"))?;

        let err = index.claim(1, token("T")).unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::MultipleRowsWithSameToken { rows } if rows == vec![0, 1]
        ));
        Ok(())
    }

    #[test]
    fn claim_rejects_non_empty_row() {
        let mut index = RowIndex::default();
        index.insert(0, 0, RowMark::Track(token("T")));

        assert!(matches!(
            index.claim(0, token("U")),
            Err(ReconcileError::RowNotEmpty(0))
        ));
    }
}
