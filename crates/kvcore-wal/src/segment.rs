use std::path::{Path, PathBuf};

/// Segment file names are the first sequence number they contain, zero-padded
/// to 20 digits, with a `.wal` suffix (§6.1) — e.g. `00000000000000000001.wal`.
const DIGITS: usize = 20;
const SUFFIX: &str = ".wal";

pub fn segment_file_name(first_sequence: u64) -> String {
    format!("{first_sequence:0width$}{SUFFIX}", width = DIGITS)
}

pub fn segment_path(dir: &Path, first_sequence: u64) -> PathBuf {
    dir.join(segment_file_name(first_sequence))
}

/// Parses a file name back into its first-sequence number. Returns `None` for
/// anything that isn't a well-formed segment name, so callers can silently
/// skip unrelated files sharing the data directory.
pub fn parse_segment_name(name: &str) -> Option<u64> {
    let digits = name.strip_suffix(SUFFIX)?;
    if digits.len() != DIGITS {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_name_and_back() {
        let name = segment_file_name(42);
        assert_eq!(name, "00000000000000000042.wal");
        assert_eq!(parse_segment_name(&name), Some(42));
    }

    #[test]
    fn rejects_unrelated_file_names() {
        assert_eq!(parse_segment_name("LOCK"), None);
        assert_eq!(parse_segment_name("CURRENT"), None);
        assert_eq!(parse_segment_name("not-a-number.wal"), None);
    }
}
