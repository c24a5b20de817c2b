//! Episode catalog
//!
//! A plain-text list of season headers, episode titles and stream links,
//! parsed once into an ordered, read-only [`Catalog`].
//!
//! ```text
//! SEZON 1
//! Pilot
//! https://cdn.example/s01e01.mp4
//! ```

mod parser;
mod query;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub use parser::{parse_lines, LineKind};

/// Errors from loading a catalog file
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file '{0}' not found")]
    SourceNotFound(PathBuf),
    #[error("Could not read catalog '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No seasons or episodes found")]
    EmptyCatalog,
}

/// A single playable entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub url: String,
}

impl Episode {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// A labelled group of episodes, in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Season {
    label: String,
    episodes: Vec<Episode>,
}

impl Season {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            episodes: Vec::new(),
        }
    }

    /// Header line exactly as written in the file
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} episodes)", self.label, self.episodes.len())
    }
}

/// Parsed catalog: seasons in header order, each with its episodes in
/// file order. Always holds at least one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    seasons: Vec<Season>,
}

impl Catalog {
    /// Parse catalog text
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        parse_lines(text.lines())
    }

    /// Parse already-split lines
    pub fn from_lines<I, S>(lines: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        parse_lines(lines)
    }

    /// Read and parse a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::SourceNotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CatalogError::SourceNotFound(path.to_path_buf())
            } else {
                CatalogError::ReadError {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let catalog = Self::parse(&text)?;
        info!(
            path = %path.display(),
            seasons = catalog.season_count(),
            episodes = catalog.episode_count(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Seasons with their episodes
    pub fn season_entries(&self) -> &[Season] {
        &self.seasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_episode_display() {
        let ep = Episode::new("Pilot", "https://x/1");
        assert_eq!(ep.to_string(), "Pilot");
    }

    #[test]
    fn test_season_display() {
        let catalog = Catalog::parse("SEZON 1\nA\nhttp://a\nB\nhttp://b\n").unwrap();
        assert_eq!(
            catalog.season_entries()[0].to_string(),
            "SEZON 1 (2 episodes)"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(dir.path().join("links.txt")).unwrap_err();
        assert!(matches!(err, CatalogError::SourceNotFound(_)));
        assert!(err.to_string().contains("links.txt"));
    }

    #[test]
    fn test_load_invalid_utf8_is_read_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"SEZON 1\n\xff\xfe\n").unwrap();
        let err = Catalog::load(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::ReadError { .. }));
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::ReadError { .. }));
    }

    #[test]
    fn test_load_roundtrip_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SEZON 1\r\nPilot\r\nhttps://x/1\r\n").unwrap();
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.episodes_of("SEZON 1"), &[Episode::new("Pilot", "https://x/1")]);
    }
}
