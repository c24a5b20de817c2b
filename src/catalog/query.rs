//! Read-only views over a parsed catalog

use rand::seq::IndexedRandom;
use rand::Rng;

use super::{Catalog, Episode};

impl Catalog {
    /// Season labels in header order
    pub fn seasons(&self) -> impl Iterator<Item = &str> + '_ {
        self.seasons.iter().map(|s| s.label.as_str())
    }

    /// Episodes of one season, empty if the label is unknown
    pub fn episodes_of(&self, season: &str) -> &[Episode] {
        self.seasons
            .iter()
            .find(|s| s.label == season)
            .map(|s| s.episodes.as_slice())
            .unwrap_or(&[])
    }

    /// Every episode, season by season
    pub fn all_episodes(&self) -> Vec<&Episode> {
        self.seasons.iter().flat_map(|s| s.episodes.iter()).collect()
    }

    /// Every episode paired with its 1-based position in [`Self::all_episodes`]
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Episode)> + '_ {
        self.seasons
            .iter()
            .flat_map(|s| s.episodes.iter())
            .enumerate()
            .map(|(i, ep)| (i + 1, ep))
    }

    /// Episode at a 1-based flattened position
    pub fn episode_at(&self, number: usize) -> Option<&Episode> {
        number
            .checked_sub(1)
            .and_then(|idx| self.seasons.iter().flat_map(|s| s.episodes.iter()).nth(idx))
    }

    /// Search hits with their flattened numbers.
    ///
    /// An episode matches when the decimal form of its number contains the
    /// query ("2" hits 2, 12, 20..), or its lower-cased title does. The query
    /// is trimmed and lower-cased first; an empty query matches everything.
    pub fn search_numbered(&self, query: &str) -> Vec<(usize, &Episode)> {
        let query = query.trim().to_lowercase();
        self.numbered()
            .filter(|(number, ep)| {
                number.to_string().contains(&query) || ep.title.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Search hits in flattened order
    pub fn search(&self, query: &str) -> Vec<&Episode> {
        self.search_numbered(query)
            .into_iter()
            .map(|(_, ep)| ep)
            .collect()
    }

    /// Uniformly random episode, `None` if there are no episodes
    pub fn random_episode(&self) -> Option<&Episode> {
        self.random_episode_with(&mut rand::rng())
    }

    /// [`Self::random_episode`] with a caller-supplied generator
    pub fn random_episode_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Episode> {
        self.all_episodes().choose(rng).copied()
    }

    pub fn season_count(&self) -> usize {
        self.seasons.len()
    }

    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }

    /// True when no season has any episode
    pub fn is_empty(&self) -> bool {
        self.episode_count() == 0
    }
}
