//! The built-in table-driven classifier.
//!
//! Rules are tried in a fixed order, and the first match wins:
//!
//! 1. vendored directories and configured vendored prefixes
//! 2. generated file names (lockfiles, minified bundles, protobuf output)
//! 3. configured file name overrides, then configured extension overrides
//! 4. built-in file names (`Makefile`, `Dockerfile`, ...)
//! 5. documentation (`docs/`, `README*`, prose extensions)
//! 6. built-in extensions
//! 7. content: binary sniffing, then the shebang interpreter
//!
//! Only step 7 reads the blob.

use std::collections::BTreeMap;

use langstat_common::ContentHash;
use langstat_config::ClassifierConfig;

use crate::classifier::{BlobContent, Classification, Classifier, ClassifyError, Exclusion};
use crate::tables;

/// A NUL byte within this many leading bytes marks a file as binary.
const BINARY_SNIFF_LEN: usize = 8000;

/// Classifier driven by path tables, user overrides, and shebang lines.
#[derive(Debug, Clone)]
pub struct ExtensionClassifier {
    extensions: BTreeMap<String, String>,
    filenames: BTreeMap<String, String>,
    vendored: Vec<String>,
    version: String,
}

impl ExtensionClassifier {
    /// Creates a classifier using only the built-in tables.
    pub fn new() -> Self {
        Self::with_overrides(&ClassifierConfig::default())
    }

    /// Creates a classifier with user overrides layered over the built-in tables.
    ///
    /// Non-empty overrides are fingerprinted into [`Classifier::version`].
    pub fn with_overrides(config: &ClassifierConfig) -> Self {
        let crate_version = env!("CARGO_PKG_VERSION");
        let version = if config.is_empty() {
            crate_version.to_string()
        } else {
            format!("{crate_version}+{}", overrides_fingerprint(config).short())
        };
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|(ext, lang)| (ext.trim_start_matches('.').to_ascii_lowercase(), lang.clone()))
                .collect(),
            filenames: config.filenames.clone(),
            vendored: config.vendored.clone(),
            version,
        }
    }

    fn classify_path(&self, path: &str) -> Option<Classification> {
        let (dirs, name) = path.rsplit_once('/').unwrap_or(("", path));
        let ext = extension(name);

        if self.is_vendored(path, dirs) {
            return Some(Classification::Excluded(Exclusion::Vendored));
        }
        if is_generated(name) {
            return Some(Classification::Excluded(Exclusion::Generated));
        }
        if let Some(lang) = self.filenames.get(name) {
            return Some(Classification::Language(lang.clone()));
        }
        if let Some(lang) = ext.as_deref().and_then(|e| self.extensions.get(e)) {
            return Some(Classification::Language(lang.clone()));
        }
        if let Some(lang) = tables::lookup(tables::FILENAMES, name) {
            return Some(Classification::Language(lang.to_string()));
        }
        if is_documentation(dirs, name, ext.as_deref()) {
            return Some(Classification::Excluded(Exclusion::Documentation));
        }
        ext.as_deref()
            .and_then(|e| tables::lookup(tables::EXTENSIONS, e))
            .map(|lang| Classification::Language(lang.to_string()))
    }

    fn is_vendored(&self, path: &str, dirs: &str) -> bool {
        self.vendored.iter().any(|prefix| path.starts_with(prefix.as_str()))
            || (!dirs.is_empty()
                && dirs
                    .split('/')
                    .any(|component| tables::VENDORED_DIRS.contains(&component)))
    }
}

impl Default for ExtensionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for ExtensionClassifier {
    fn version(&self) -> &str {
        &self.version
    }

    fn classify(
        &self,
        path: &str,
        blob: &dyn BlobContent,
    ) -> Result<Classification, ClassifyError> {
        if let Some(found) = self.classify_path(path) {
            tracing::trace!(path, ?found, "classified by path");
            return Ok(found);
        }
        let found = classify_content(blob.data()?);
        tracing::trace!(path, ?found, "classified by content");
        Ok(found)
    }
}

/// Lowercase extension of a file name. Dotfiles like `.bashrc` have none.
fn extension(name: &str) -> Option<String> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_ascii_lowercase()),
        _ => None,
    }
}

fn is_generated(name: &str) -> bool {
    tables::GENERATED_FILENAMES.contains(&name)
        || tables::GENERATED_SUFFIXES
            .iter()
            .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix))
}

fn is_documentation(dirs: &str, name: &str, ext: Option<&str>) -> bool {
    let top_dir = dirs.split('/').next().unwrap_or("");
    let stem = name.split('.').next().unwrap_or(name).to_ascii_uppercase();
    tables::DOC_DIRS.contains(&top_dir)
        || tables::DOC_STEMS.contains(&stem.as_str())
        || ext.is_some_and(|e| tables::DOC_EXTENSIONS.contains(&e))
}

fn classify_content(data: &[u8]) -> Classification {
    let sniff = &data[..data.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return Classification::Excluded(Exclusion::Binary);
    }
    match shebang_language(data) {
        Some(lang) => Classification::Language(lang.to_string()),
        None => Classification::Excluded(Exclusion::Unknown),
    }
}

/// Maps a `#!` line to a language, following `env` indirection.
fn shebang_language(data: &[u8]) -> Option<&'static str> {
    let rest = data.strip_prefix(b"#!")?;
    let line_end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    let line = std::str::from_utf8(&rest[..line_end]).ok()?;

    let mut tokens = line.split_whitespace();
    let mut program = basename(tokens.next()?);
    if program == "env" {
        program = basename(tokens.find(|t| !t.starts_with('-'))?);
    }
    let name = program.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    tables::lookup(tables::INTERPRETERS, name)
}

fn basename(program: &str) -> &str {
    program.rsplit('/').next().unwrap_or(program)
}

/// Stable fingerprint of the overrides, independent of map iteration order.
fn overrides_fingerprint(config: &ClassifierConfig) -> ContentHash {
    let mut canonical = String::new();
    for (ext, lang) in &config.extensions {
        canonical.push_str(&format!("ext:{ext}={lang}\n"));
    }
    for (name, lang) in &config.filenames {
        canonical.push_str(&format!("name:{name}={lang}\n"));
    }
    for prefix in &config.vendored {
        canonical.push_str(&format!("vendored:{prefix}\n"));
    }
    ContentHash::from_bytes(canonical.as_bytes())
}
