//! Per-file language assignments and the per-language totals derived from them.
//!
//! [`LanguageStats`] stores only the breakdown (path to language and size).
//! Totals are recomputed from it on demand, so the two views cannot drift
//! apart no matter how many incremental updates are applied.

use std::collections::{BTreeMap, HashMap};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// The language and size recorded for one tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// Language name assigned by the classifier.
    pub language: String,

    /// Blob size in bytes.
    pub size: u64,
}

impl FileStat {
    /// Creates a file entry.
    pub fn new(language: impl Into<String>, size: u64) -> Self {
        Self {
            language: language.into(),
            size,
        }
    }
}

/// Classified files of one repository snapshot, keyed by repository-relative path.
///
/// Files the classifier excluded are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageStats {
    files: BTreeMap<String, FileStat>,
}

impl LanguageStats {
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a file, returning the entry it replaced.
    pub fn insert(&mut self, path: impl Into<String>, stat: FileStat) -> Option<FileStat> {
        self.files.insert(path.into(), stat)
    }

    /// Forgets a file, returning its entry if it was present.
    pub fn remove(&mut self, path: &str) -> Option<FileStat> {
        self.files.remove(path)
    }

    /// Looks up the entry for a path.
    pub fn get(&self, path: &str) -> Option<&FileStat> {
        self.files.get(path)
    }

    /// Number of classified files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no file is classified.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates files in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileStat)> {
        self.files.iter().map(|(path, stat)| (path.as_str(), stat))
    }

    /// Path to language mapping, sorted by path.
    pub fn breakdown(&self) -> BTreeMap<&str, &str> {
        self.iter()
            .map(|(path, stat)| (path, stat.language.as_str()))
            .collect()
    }

    /// Sums file sizes per language.
    pub fn totals(&self) -> LanguageTotals {
        let mut sums: HashMap<&str, u64> = HashMap::new();
        for stat in self.files.values() {
            *sums.entry(stat.language.as_str()).or_default() += stat.size;
        }
        let mut entries: Vec<(String, u64)> = sums
            .into_iter()
            .map(|(lang, size)| (lang.to_string(), size))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        LanguageTotals { entries }
    }
}

/// Aggregate size per language, largest first, ties broken by name.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageTotals {
    entries: Vec<(String, u64)>,
}

impl LanguageTotals {
    /// Size recorded for a language, if any file was assigned to it.
    pub fn get(&self, language: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(_, size)| *size)
    }

    /// Iterates languages in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(lang, size)| (lang.as_str(), *size))
    }

    /// Number of distinct languages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no language has any bytes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LanguageTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (lang, size) in &self.entries {
            map.serialize_entry(lang, size)?;
        }
        map.end()
    }
}
