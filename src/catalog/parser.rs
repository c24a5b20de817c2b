//! Catalog text format parser
//!
//! Lines are trimmed and classified one at a time. Malformed sequences are
//! dropped rather than rejected; the only failure is a catalog with no
//! season headers at all.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{Catalog, CatalogError, Episode, Season};

/// `SEZON <digits>` at the start of a line, any case
static SEASON_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^SEZON\s+\d+").expect("season header pattern is valid"));

/// What a single trimmed catalog line means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty after trimming
    Blank,
    /// Season header; the whole line is the label
    Season(&'a str),
    /// Playable link
    Url(&'a str),
    /// Anything else becomes the pending title
    Title(&'a str),
}

impl<'a> LineKind<'a> {
    /// Classify a raw line (trimming is done here)
    pub fn classify(raw: &'a str) -> Self {
        let line = raw.trim();
        if line.is_empty() {
            LineKind::Blank
        } else if SEASON_HEADER.is_match(line) {
            LineKind::Season(line)
        } else if line.starts_with("http://") || line.starts_with("https://") {
            LineKind::Url(line)
        } else {
            LineKind::Title(line)
        }
    }
}

/// Incremental parser state
#[derive(Debug, Default)]
struct Builder {
    seasons: Vec<Season>,
    /// Index into `seasons` of the open season
    current: Option<usize>,
    pending_title: Option<String>,
}

impl Builder {
    fn feed(&mut self, line_no: usize, kind: LineKind<'_>) {
        match kind {
            LineKind::Blank => {}
            LineKind::Season(label) => {
                // A repeated label keeps its slot but starts over empty
                let idx = match self.seasons.iter().position(|s| s.label == label) {
                    Some(idx) => {
                        self.seasons[idx].episodes.clear();
                        idx
                    }
                    None => {
                        self.seasons.push(Season::new(label));
                        self.seasons.len() - 1
                    }
                };
                self.current = Some(idx);
                self.pending_title = None;
            }
            LineKind::Url(url) => match (self.current, self.pending_title.take()) {
                (Some(idx), Some(title)) => {
                    self.seasons[idx].episodes.push(Episode::new(title, url));
                }
                (None, _) => debug!(line = line_no, url, "dropping url outside any season"),
                (Some(_), None) => debug!(line = line_no, url, "dropping url without a title"),
            },
            LineKind::Title(title) => {
                if let Some(previous) = self.pending_title.replace(title.to_string()) {
                    debug!(line = line_no, title = %previous, "dropping title without a url");
                }
            }
        }
    }

    fn finish(self) -> Result<Catalog, CatalogError> {
        if let Some(title) = self.pending_title {
            debug!(title = %title, "dropping trailing title without a url");
        }
        if self.seasons.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        Ok(Catalog {
            seasons: self.seasons,
        })
    }
}

/// Parse a sequence of raw lines into a catalog
pub fn parse_lines<I, S>(lines: I) -> Result<Catalog, CatalogError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = Builder::default();
    for (idx, line) in lines.into_iter().enumerate() {
        builder.feed(idx + 1, LineKind::classify(line.as_ref()));
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_blank() {
        assert_eq!(LineKind::classify(""), LineKind::Blank);
        assert_eq!(LineKind::classify("   \t "), LineKind::Blank);
    }

    #[test]
    fn test_classify_season_header_any_case() {
        assert_eq!(LineKind::classify("SEZON 1"), LineKind::Season("SEZON 1"));
        assert_eq!(LineKind::classify("  sezon 12 "), LineKind::Season("sezon 12"));
        assert_eq!(LineKind::classify("Sezon\t3"), LineKind::Season("Sezon\t3"));
        // Trailing text after the number still counts as a header
        assert_eq!(
            LineKind::classify("SEZON 4 (2002)"),
            LineKind::Season("SEZON 4 (2002)")
        );
    }

    #[test]
    fn test_classify_not_a_header() {
        assert_eq!(LineKind::classify("SEZON"), LineKind::Title("SEZON"));
        assert_eq!(LineKind::classify("SEZON X"), LineKind::Title("SEZON X"));
        assert_eq!(LineKind::classify("SEZON1"), LineKind::Title("SEZON1"));
        assert_eq!(
            LineKind::classify("Ostatni SEZON 5"),
            LineKind::Title("Ostatni SEZON 5")
        );
    }

    #[test]
    fn test_classify_urls() {
        assert_eq!(
            LineKind::classify("https://cdn.example/1.mp4"),
            LineKind::Url("https://cdn.example/1.mp4")
        );
        assert_eq!(
            LineKind::classify(" http://x "),
            LineKind::Url("http://x")
        );
        // Scheme match is case-sensitive and needs both slashes
        assert_eq!(LineKind::classify("HTTP://x"), LineKind::Title("HTTP://x"));
        assert_eq!(LineKind::classify("https:/x"), LineKind::Title("https:/x"));
        assert_eq!(LineKind::classify("ftp://x"), LineKind::Title("ftp://x"));
    }

    #[test]
    fn test_url_before_any_season_is_dropped() {
        let catalog = parse_lines(["A", "http://x", "SEZON 1", "B", "http://y"]).unwrap();
        assert_eq!(catalog.seasons().collect::<Vec<_>>(), vec!["SEZON 1"]);
        assert_eq!(
            catalog.episodes_of("SEZON 1"),
            &[Episode::new("B", "http://y")]
        );
    }

    #[test]
    fn test_header_clears_pending_title() {
        let catalog = parse_lines(["SEZON 1", "A", "SEZON 2", "http://x"]).unwrap();
        assert!(catalog.episodes_of("SEZON 1").is_empty());
        assert!(catalog.episodes_of("SEZON 2").is_empty());
    }

    #[test]
    fn test_consecutive_urls_keep_only_first() {
        let catalog = parse_lines(["SEZON 1", "A", "http://x", "http://y"]).unwrap();
        assert_eq!(
            catalog.episodes_of("SEZON 1"),
            &[Episode::new("A", "http://x")]
        );
    }

    #[test]
    fn test_repeated_header_resets_in_place() {
        let catalog = parse_lines([
            "SEZON 1", "A", "http://a", "SEZON 2", "B", "http://b", "SEZON 1", "C", "http://c",
        ])
        .unwrap();
        assert_eq!(
            catalog.seasons().collect::<Vec<_>>(),
            vec!["SEZON 1", "SEZON 2"]
        );
        assert_eq!(
            catalog.episodes_of("SEZON 1"),
            &[Episode::new("C", "http://c")]
        );
        assert_eq!(
            catalog.episodes_of("SEZON 2"),
            &[Episode::new("B", "http://b")]
        );
    }

    #[test]
    fn test_labels_differing_in_case_are_distinct() {
        let catalog = parse_lines(["SEZON 1", "sezon 1"]).unwrap();
        assert_eq!(catalog.season_count(), 2);
    }

    #[test]
    fn test_only_titles_is_empty_catalog() {
        let err = parse_lines(["just", "some", "titles"]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyCatalog));
    }

    #[test]
    fn test_no_lines_is_empty_catalog() {
        let err = parse_lines(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyCatalog));
    }
}
