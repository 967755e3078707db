//! User-facing status messages

use crate::{provider::ResourceKind, reconcile::FillCounts};

pub const EMPTY_URL: &str = "URL is empty";
pub const UNSUPPORTED_URL: &str = "URL type is not currently supported";
pub const NO_TRACKS_FOUND: &str = "No tracks found";
pub const ERROR_NOTIFICATION: &str = "Error in Playlister. Please report an issue.";

pub fn track_count(count: usize) -> String {
    format!("{count} track{}", if count == 1 { "" } else { "s" })
}

pub fn processing(provider: &str, kind: ResourceKind) -> String {
    format!("Processing {provider}: {kind}...")
}

/// Turns the outcome of a batch of `total` tracks into one line.
pub fn summarize(counts: &FillCounts, total: usize) -> String {
    if counts.success == total {
        return format!("{} filled successfully", track_count(counts.success));
    }
    let mut parts = vec![format!("{} filled", track_count(counts.success))];
    if counts.no_free_row > 0 {
        parts.push(format!(
            "{} skipped as all rows are filled",
            track_count(counts.no_free_row)
        ));
    }
    if counts.duplicate > 0 {
        parts.push(format!(
            "{} skipped as duplicate",
            track_count(counts.duplicate)
        ));
    }
    parts.join(", ")
}
