use std::cmp::Ordering;

use crate::types::ArtistCounts;

/// Default minimum number of occurrences for an artist to be reported.
pub const DEFAULT_MIN_COUNT: u64 = 5;

const BANNER: &str = "\n\n--------------------------------\nPlaylist Statistics\n--------------------------------\n\n";

/// Artists with their counts, most frequent first. Equal counts are ordered
/// by artist name.
pub fn ranked(counts: &ArtistCounts) -> Vec<(&str, u64)> {
    let mut pairs: Vec<(&str, u64)> = counts
        .iter()
        .map(|(artist, count)| (artist.as_str(), *count))
        .collect();

    pairs.sort_by(|a, b| match b.1.cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });
    pairs
}

/// Renders the report: a banner followed by one line per artist seen at
/// least `min_count` times.
pub fn render_stats(counts: &ArtistCounts, min_count: u64) -> String {
    let mut out = String::from(BANNER);
    for (artist, count) in ranked(counts) {
        if count < min_count {
            break;
        }
        out.push_str(&format!("* {} - {}\n", artist, count));
    }
    out
}

pub fn print_stats(counts: &ArtistCounts, min_count: u64) {
    print!("{}", render_stats(counts, min_count));
}
