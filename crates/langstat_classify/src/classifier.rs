//! The classifier interface.

/// Why a file does not count toward any language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Content looks binary.
    Binary,
    /// Third-party code checked into the repository.
    Vendored,
    /// Machine-generated output such as lockfiles or minified bundles.
    Generated,
    /// Prose rather than code.
    Documentation,
    /// No rule recognised the file.
    Unknown,
}

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The file counts toward the named language.
    Language(String),
    /// The file is left out of the statistics entirely.
    Excluded(Exclusion),
}

impl Classification {
    /// Returns the language name, or `None` for excluded files.
    pub fn language(&self) -> Option<&str> {
        match self {
            Classification::Language(name) => Some(name),
            Classification::Excluded(_) => None,
        }
    }
}

/// Errors raised while classifying.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// The file content could not be loaded.
    #[error("cannot read content of {path}: {reason}")]
    Content {
        /// Path of the file being classified.
        path: String,
        /// Description of the failure.
        reason: String,
    },
}

/// Lazy access to a file's content.
///
/// Classifiers that can decide from the path alone never call [`data`](Self::data),
/// so the blob is only read when it matters.
pub trait BlobContent {
    /// Size of the content in bytes.
    fn size(&self) -> u64;

    /// The full content, loaded on first use.
    fn data(&self) -> Result<&[u8], ClassifyError>;
}

impl BlobContent for &[u8] {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    fn data(&self) -> Result<&[u8], ClassifyError> {
        Ok(self)
    }
}

impl BlobContent for Vec<u8> {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    fn data(&self) -> Result<&[u8], ClassifyError> {
        Ok(self)
    }
}

/// Assigns languages to files.
pub trait Classifier {
    /// Version identifier embedded in the cache format version.
    ///
    /// Must change whenever the classifier could produce a different answer
    /// for the same input, so stale caches are discarded.
    fn version(&self) -> &str;

    /// Classifies the file at `path` (repository-relative, `/`-separated).
    fn classify(&self, path: &str, blob: &dyn BlobContent)
        -> Result<Classification, ClassifyError>;
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn version(&self) -> &str {
        (**self).version()
    }

    fn classify(
        &self,
        path: &str,
        blob: &dyn BlobContent,
    ) -> Result<Classification, ClassifyError> {
        (**self).classify(path, blob)
    }
}
