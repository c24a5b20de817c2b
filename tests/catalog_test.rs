//! Catalog parsing and query tests
//!
//! Covers the text format tolerance rules, numbering, search and random
//! selection, plus loading from disk.

use std::io::Write;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sezontui::{Catalog, CatalogError, Episode};
use tempfile::NamedTempFile;

// =============================================================================
// Fixtures
// =============================================================================

fn pairs(episodes: &[Episode]) -> Vec<(&str, &str)> {
    episodes
        .iter()
        .map(|e| (e.title.as_str(), e.url.as_str()))
        .collect()
}

/// Two seasons, twelve episodes, titles free of digits
fn twelve_episode_catalog() -> Catalog {
    let mut text = String::from("SEZON 1\n");
    for i in 0..7 {
        text.push_str(&format!("Odcinek {}\nhttp://s1/{}\n", letter(i), i));
    }
    text.push_str("SEZON 2\n");
    for i in 7..12 {
        text.push_str(&format!("Odcinek {}\nhttp://s2/{}\n", letter(i), i));
    }
    Catalog::parse(&text).unwrap()
}

fn letter(i: usize) -> char {
    (b'a' + i as u8) as char
}

// =============================================================================
// Parsing
// =============================================================================

mod parsing {
    use super::*;

    #[test]
    fn test_two_episodes_in_order() {
        let catalog = Catalog::parse("SEZON 1\nA\nhttp://x\nB\nhttp://y\n").unwrap();
        assert_eq!(catalog.seasons().collect::<Vec<_>>(), vec!["SEZON 1"]);
        assert_eq!(
            pairs(catalog.episodes_of("SEZON 1")),
            vec![("A", "http://x"), ("B", "http://y")]
        );
    }

    #[test]
    fn test_seasons_in_header_order() {
        let catalog =
            Catalog::parse("SEZON 3\nC\nhttp://c\nSEZON 1\nA\nhttp://a\nSEZON 2\n").unwrap();
        assert_eq!(
            catalog.seasons().collect::<Vec<_>>(),
            vec!["SEZON 3", "SEZON 1", "SEZON 2"]
        );
    }

    #[test]
    fn test_orphan_url_dropped() {
        let catalog = Catalog::parse("SEZON 1\nhttp://orphan\n").unwrap();
        assert_eq!(catalog.season_count(), 1);
        assert!(catalog.episodes_of("SEZON 1").is_empty());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_pending_title_overwritten() {
        let catalog = Catalog::parse("SEZON 1\nA\nB\nhttp://y\n").unwrap();
        assert_eq!(pairs(catalog.episodes_of("SEZON 1")), vec![("B", "http://y")]);
    }

    #[test]
    fn test_title_does_not_cross_season_header() {
        let catalog = Catalog::parse("SEZON 1\nA\nSEZON 2\nhttp://x\n").unwrap();
        assert!(catalog.episodes_of("SEZON 1").is_empty());
        assert!(catalog.episodes_of("SEZON 2").is_empty());
    }

    #[test]
    fn test_no_headers_is_empty_catalog() {
        assert!(matches!(
            Catalog::parse("just text\nmore text\n"),
            Err(CatalogError::EmptyCatalog)
        ));
        assert!(matches!(Catalog::parse(""), Err(CatalogError::EmptyCatalog)));
    }

    #[test]
    fn test_entries_before_first_header_dropped() {
        let catalog = Catalog::parse("A\nhttp://early\nSEZON 1\nB\nhttp://b\n").unwrap();
        assert_eq!(catalog.episode_count(), 1);
        assert_eq!(catalog.all_episodes()[0].url, "http://b");
    }

    #[test]
    fn test_blank_lines_and_whitespace_ignored() {
        let catalog =
            Catalog::parse("\n  sezon 1  \n\n   Pilot  \n\n  https://v/1  \n\n").unwrap();
        assert_eq!(catalog.seasons().collect::<Vec<_>>(), vec!["sezon 1"]);
        assert_eq!(
            pairs(catalog.episodes_of("sezon 1")),
            vec![("Pilot", "https://v/1")]
        );
    }

    #[test]
    fn test_crlf_lines() {
        let catalog = Catalog::parse("SEZON 1\r\nA\r\nhttp://x\r\n").unwrap();
        assert_eq!(pairs(catalog.episodes_of("SEZON 1")), vec![("A", "http://x")]);
    }

    #[test]
    fn test_empty_season_is_valid() {
        let catalog = Catalog::parse("SEZON 1\nSEZON 2\nA\nhttp://a\n").unwrap();
        assert_eq!(catalog.season_count(), 2);
        assert!(catalog.episodes_of("SEZON 1").is_empty());
    }

    #[test]
    fn test_repeated_header_keeps_position_and_resets() {
        let catalog = Catalog::parse(
            "SEZON 1\nA\nhttp://a\nSEZON 2\nB\nhttp://b\nSEZON 1\nC\nhttp://c\n",
        )
        .unwrap();
        assert_eq!(
            catalog.seasons().collect::<Vec<_>>(),
            vec!["SEZON 1", "SEZON 2"]
        );
        assert_eq!(pairs(catalog.episodes_of("SEZON 1")), vec![("C", "http://c")]);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "SEZON 1\nA\nhttp://x\nSEZON 2\nB\nhttp://y\n";
        assert_eq!(Catalog::parse(text).unwrap(), Catalog::parse(text).unwrap());
    }

    #[test]
    fn test_from_lines_matches_parse() {
        let lines = ["SEZON 1", "A", "http://x"];
        assert_eq!(
            Catalog::from_lines(lines).unwrap(),
            Catalog::parse(&lines.join("\n")).unwrap()
        );
    }
}

// =============================================================================
// Queries
// =============================================================================

mod queries {
    use super::*;

    #[test]
    fn test_unknown_season_is_empty() {
        let catalog = twelve_episode_catalog();
        assert!(catalog.episodes_of("SEZON 9").is_empty());
    }

    #[test]
    fn test_flattened_is_season_major() {
        let catalog = twelve_episode_catalog();
        let all = catalog.all_episodes();
        let per_season: usize = catalog.seasons().map(|s| catalog.episodes_of(s).len()).sum();
        assert_eq!(all.len(), per_season);
        assert_eq!(all.len(), 12);
        assert_eq!(all[0].url, "http://s1/0");
        assert_eq!(all[7].url, "http://s2/7");
    }

    #[test]
    fn test_numbering_is_one_based() {
        let catalog = twelve_episode_catalog();
        assert!(catalog.episode_at(0).is_none());
        assert_eq!(catalog.episode_at(1).unwrap().url, "http://s1/0");
        assert_eq!(catalog.episode_at(12).unwrap().url, "http://s2/11");
        assert!(catalog.episode_at(13).is_none());
    }

    #[test]
    fn test_search_index_substring() {
        let catalog = twelve_episode_catalog();
        let numbers: Vec<usize> = catalog
            .search_numbered("2")
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(numbers, vec![2, 12]);
    }

    #[test]
    fn test_search_index_and_title_hits() {
        let catalog = Catalog::parse(
            "SEZON 1\nWigilia 2\nhttp://a\nB\nhttp://b\nC\nhttp://c\n",
        )
        .unwrap();
        let titles: Vec<&str> = catalog
            .search("2")
            .into_iter()
            .map(|e| e.title.as_str())
            .collect();
        // Position 1 matches by title, position 2 by number
        assert_eq!(titles, vec!["Wigilia 2", "B"]);
    }

    #[test]
    fn test_search_trims_and_ignores_case() {
        let catalog = twelve_episode_catalog();
        let hits = catalog.search("  ODCINEK C ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Odcinek c");
    }

    #[test]
    fn test_search_empty_query_matches_all() {
        let catalog = twelve_episode_catalog();
        assert_eq!(catalog.search("").len(), 12);
        assert_eq!(catalog.search("   ").len(), 12);
    }

    #[test]
    fn test_search_no_hits() {
        let catalog = twelve_episode_catalog();
        assert!(catalog.search("zzz").is_empty());
    }

    #[test]
    fn test_random_on_empty_is_none() {
        let catalog = Catalog::parse("SEZON 1\nSEZON 2\n").unwrap();
        assert!(catalog.random_episode().is_none());
    }

    #[test]
    fn test_random_comes_from_catalog() {
        let catalog = twelve_episode_catalog();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let ep = catalog.random_episode_with(&mut rng).unwrap();
            assert!(catalog.all_episodes().contains(&ep));
        }
    }

    #[test]
    fn test_random_single_episode() {
        let catalog = Catalog::parse("SEZON 1\nA\nhttp://x\n").unwrap();
        assert_eq!(catalog.random_episode().unwrap().url, "http://x");
    }
}

// =============================================================================
// Loading
// =============================================================================

mod loading {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SEZON 1\nA\nhttp://x").unwrap();
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.episode_count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.txt");
        match Catalog::load(&path) {
            Err(CatalogError::SourceNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected SourceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Catalog::load(dir.path()),
            Err(CatalogError::ReadError { .. })
        ));
    }

    #[test]
    fn test_load_invalid_utf8_is_read_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0x53]).unwrap();
        assert!(matches!(
            Catalog::load(file.path()),
            Err(CatalogError::ReadError { .. })
        ));
    }

    #[test]
    fn test_load_file_without_headers() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "A\nhttp://x").unwrap();
        assert!(matches!(
            Catalog::load(file.path()),
            Err(CatalogError::EmptyCatalog)
        ));
    }
}
