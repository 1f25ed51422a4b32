//! File classification: which language, if any, a tracked file counts toward.
//!
//! The aggregator only sees the [`Classifier`] trait. [`ExtensionClassifier`]
//! is the built-in implementation: path rules, extension and file name
//! tables, and a shebang fallback.

#![warn(missing_docs)]

pub mod classifier;
pub mod extension;
mod tables;

pub use classifier::{BlobContent, Classification, Classifier, ClassifyError, Exclusion};
pub use extension::ExtensionClassifier;
