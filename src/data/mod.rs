//! Reference data: bosses and gyms.
//!
//! Lists are loaded from JSON or CSV, from a file or an http(s) URL, and
//! looked up by approximate name. [`ReferenceData`] keeps the current lists
//! as shared snapshots; reloading swaps the snapshot and never mutates a
//! list that an extraction may be reading.

pub mod boss;
pub mod gym;
pub mod source;

pub use boss::{Boss, BossList};
pub use gym::{Gym, GymList};

use chrono::{DateTime, Local, TimeDelta};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::similarity::best_match;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Http { url: String, source: reqwest::Error },
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("invalid CSV: {0}")]
    InvalidCsv(String),
}

/// Entries that can be looked up by name.
pub trait Named {
    fn name(&self) -> &str;
}

/// An immutable, loaded list of reference entries.
#[derive(Debug, Clone)]
pub struct DataList<T> {
    entries: Vec<T>,
    loaded_at: DateTime<Local>,
}

impl<T: Named> DataList<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self {
            entries,
            loaded_at: Local::now(),
        }
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    /// Entry whose name is most similar to `name`, if it reaches `threshold`.
    pub fn find(&self, name: &str, threshold: f64) -> Option<&T> {
        log::debug!("Looking for a candidate for '{}'", name);

        let found = best_match(
            name,
            self.entries.iter().map(|e| (e.name(), e)),
            threshold,
        );

        match found {
            Some((entry, score)) => {
                log::debug!("Found '{}' with confidence {:.3}", entry.name(), score);
                Some(entry)
            }
            None => {
                log::debug!("No candidate found");
                None
            }
        }
    }
}

/// Read-only view of the reference lists taken at one point in time.
#[derive(Debug, Clone, Default)]
pub struct DataSnapshot {
    pub bosses: Option<Arc<BossList>>,
    pub gyms: Option<Arc<GymList>>,
}

impl DataSnapshot {
    pub fn has_bosses(&self) -> bool {
        self.bosses.is_some()
    }

    pub fn find_boss(&self, name: &str, threshold: f64) -> Option<Boss> {
        self.bosses.as_ref()?.find(name, threshold).cloned()
    }

    pub fn find_gym(&self, name: &str, threshold: f64) -> Option<Gym> {
        self.gyms.as_ref()?.find(name, threshold).cloned()
    }
}

/// Current boss and gym lists, shared between extractions.
#[derive(Debug, Default)]
pub struct ReferenceData {
    bosses: RwLock<Option<Arc<BossList>>>,
    gyms: RwLock<Option<Arc<GymList>>>,
}

impl ReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bosses(&self, list: BossList) {
        let mut slot = self.bosses.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(list));
    }

    pub fn set_gyms(&self, list: GymList) {
        let mut slot = self.gyms.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(list));
    }

    pub fn bosses(&self) -> Option<Arc<BossList>> {
        self.bosses.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn gyms(&self) -> Option<Arc<GymList>> {
        self.gyms.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn snapshot(&self) -> DataSnapshot {
        DataSnapshot {
            bosses: self.bosses(),
            gyms: self.gyms(),
        }
    }

    /// Loads the boss list from a file path or URL and swaps it in.
    ///
    /// On failure the previous list stays in place.
    pub fn load_bosses(&self, source: &str) -> Result<usize, DataError> {
        log::info!("Loading bosses from {}", source);
        let list = BossList::parse(&source::fetch(source)?)?;
        let count = list.len();
        self.set_bosses(list);
        log::info!("Bosses list is loaded with {} bosses", count);
        Ok(count)
    }

    /// Loads the gym list from a file path or URL and swaps it in.
    pub fn load_gyms(&self, source: &str) -> Result<usize, DataError> {
        log::info!("Loading gyms from {}", source);
        let list = GymList::parse(&source::fetch(source)?)?;
        let count = list.len();
        self.set_gyms(list);
        log::info!("Gyms list is loaded with {} gyms", count);
        Ok(count)
    }

    pub fn find_boss(&self, name: &str, threshold: f64) -> Option<Boss> {
        self.snapshot().find_boss(name, threshold)
    }

    pub fn find_gym(&self, name: &str, threshold: f64) -> Option<Gym> {
        self.snapshot().find_gym(name, threshold)
    }

    /// Whether a loaded list is older than `expiration` at `now`.
    pub fn is_stale(&self, expiration: TimeDelta, now: DateTime<Local>) -> bool {
        let boss_time = self.bosses().map(|l| l.loaded_at());
        let gym_time = self.gyms().map(|l| l.loaded_at());

        [boss_time, gym_time]
            .into_iter()
            .flatten()
            .any(|loaded_at| now - loaded_at > expiration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bosses(names: &[&str]) -> BossList {
        BossList::new(names.iter().map(|n| Boss::new(n)).collect())
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let list = bosses(&["Mewtwo", "Tyranitar", "Groudon"]);

        assert_eq!(list.find("tyrantar", 0.4).map(|b| b.name.as_str()), Some("Tyranitar"));
        assert_eq!(list.find("GROUDON", 0.4).map(|b| b.name.as_str()), Some("Groudon"));
        assert!(list.find("xxxxxxxx", 0.4).is_none());
    }

    #[test]
    fn test_find_first_maximum_wins() {
        let list = bosses(&["Abc", "Abd"]);
        assert_eq!(list.find("ab", 0.4).map(|b| b.name.as_str()), Some("Abc"));
    }

    #[test]
    fn test_unloaded_reference_data_finds_nothing() {
        let data = ReferenceData::new();

        assert!(data.find_boss("Mewtwo", 0.4).is_none());
        assert!(data.find_gym("Fountain", 0.6).is_none());
        assert!(!data.snapshot().has_bosses());
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let data = ReferenceData::new();
        data.set_bosses(bosses(&["Mewtwo"]));

        let snapshot = data.snapshot();
        data.set_bosses(bosses(&["Groudon"]));

        assert!(snapshot.find_boss("Mewtwo", 0.8).is_some());
        assert!(data.find_boss("Mewtwo", 0.8).is_none());
        assert!(data.find_boss("Groudon", 0.8).is_some());
    }

    #[test]
    fn test_is_stale() {
        let data = ReferenceData::new();
        let now = Local::now();
        assert!(!data.is_stale(TimeDelta::hours(24), now));

        data.set_gyms(GymList::new(vec![Gym::new("Fountain")]));
        assert!(!data.is_stale(TimeDelta::hours(24), now));
        assert!(data.is_stale(TimeDelta::hours(24), now + TimeDelta::hours(25)));
    }
}
