//! The on-disk cache file.
//!
//! Layout: 4 magic bytes, a 16-byte XXH3 checksum of the uncompressed
//! payload, then the zlib-compressed bincode encoding of the record tuple.
//! The checksum catches torn writes that zlib alone would decode as a
//! shorter, valid-looking stream.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use langstat_common::{ContentHash, LanguageStats};

use crate::error::CacheError;
use crate::record::{CacheLookup, CacheRecord, MissReason, RawCacheRecord};

/// Magic bytes identifying a statistics cache file.
const CACHE_MAGIC: [u8; 4] = *b"LSTC";

/// Magic plus checksum.
const HEADER_LEN: usize = CACHE_MAGIC.len() + 16;

/// Default zlib level, matching `[cache] compression_level`.
const DEFAULT_COMPRESSION: u32 = 6;

/// Reads and writes the single cache record of one repository.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    format_version: String,
    compression: u32,
}

impl CacheStore {
    /// Creates a store for the cache file at `path`.
    ///
    /// Records written under any other `format_version` read as misses.
    pub fn new(path: impl Into<PathBuf>, format_version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            format_version: format_version.into(),
            compression: DEFAULT_COMPRESSION,
        }
    }

    /// Sets the zlib compression level (0-9, clamped).
    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = level.min(9);
        self
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The format version this store reads and writes.
    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    /// Reads the cached record.
    ///
    /// Never fails: a missing, unreadable, corrupt, or outdated file is a
    /// [`CacheLookup::Miss`] and the caller recomputes from scratch.
    pub fn read(&self) -> CacheLookup {
        let raw = match self.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no statistics cache");
                return CacheLookup::Miss(MissReason::NotFound);
            }
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unreadable statistics cache");
                return CacheLookup::Miss(MissReason::Corrupt);
            }
        };

        if raw.format_version() != self.format_version {
            tracing::debug!(
                found = raw.format_version(),
                expected = %self.format_version,
                "statistics cache version mismatch"
            );
            return CacheLookup::Miss(MissReason::VersionMismatch);
        }

        match raw.into_record() {
            Some(record) => CacheLookup::Hit(record),
            None => {
                tracing::debug!(path = %self.path.display(), "statistics cache has a malformed revision");
                CacheLookup::Miss(MissReason::Corrupt)
            }
        }
    }

    /// Reads the stored tuple without checking its format version.
    ///
    /// Returns `None` when there is no cache or it cannot be decoded.
    pub fn read_raw(&self) -> Option<RawCacheRecord> {
        match self.load() {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unreadable statistics cache");
                None
            }
        }
    }

    /// Replaces the cache file with `record`.
    ///
    /// The record goes to a temporary file in the same directory which is
    /// then renamed over the destination, so readers see either the old
    /// file or the new one. On failure the temporary file is removed.
    pub fn write(&self, record: &CacheRecord) -> Result<(), CacheError> {
        let bytes = self.encode(record)?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| CacheError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".language-stats")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| CacheError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        let tmp_path = tmp.path().to_path_buf();
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| CacheError::Io {
                path: tmp_path,
                source: e,
            })?;

        tmp.persist(&self.path).map_err(|e| CacheError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            files = record.stats().len(),
            frozen = matches!(record, CacheRecord::Frozen { .. }),
            "wrote statistics cache"
        );
        Ok(())
    }

    /// Removes the cache file. A missing file is not an error.
    pub fn delete(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn encode(&self, record: &CacheRecord) -> Result<Vec<u8>, CacheError> {
        let tuple: (&str, String, &LanguageStats) = (
            &self.format_version,
            record.disk_revision().to_string(),
            record.stats(),
        );
        let payload = bincode::serde::encode_to_vec(tuple, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        let mut out = Vec::with_capacity(HEADER_LEN + payload.len() / 2);
        out.extend_from_slice(&CACHE_MAGIC);
        out.extend_from_slice(ContentHash::from_bytes(&payload).as_bytes());

        let compress_err = |e: std::io::Error| CacheError::Serialization {
            reason: format!("compression failed: {e}"),
        };
        let mut encoder = ZlibEncoder::new(out, Compression::new(self.compression));
        encoder.write_all(&payload).map_err(compress_err)?;
        encoder.finish().map_err(compress_err)
    }

    /// Loads and validates the file. `Ok(None)` means there is no file.
    fn load(&self) -> Result<Option<RawCacheRecord>, CacheError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        if raw.len() < HEADER_LEN {
            return Err(self.invalid_header("file shorter than header"));
        }
        if raw[..CACHE_MAGIC.len()] != CACHE_MAGIC {
            return Err(self.invalid_header("missing magic bytes"));
        }
        let expected = &raw[CACHE_MAGIC.len()..HEADER_LEN];

        let mut payload = Vec::new();
        ZlibDecoder::new(&raw[HEADER_LEN..])
            .read_to_end(&mut payload)
            .map_err(|e| CacheError::Serialization {
                reason: format!("decompression failed: {e}"),
            })?;

        let actual = ContentHash::from_bytes(&payload);
        if actual.as_bytes()[..] != *expected {
            return Err(CacheError::ChecksumMismatch {
                path: self.path.clone(),
                expected: hex(expected),
                actual: actual.to_string(),
            });
        }

        let (record, _): (RawCacheRecord, usize) =
            bincode::serde::decode_from_slice(&payload, bincode::config::standard()).map_err(
                |e| CacheError::Serialization {
                    reason: e.to_string(),
                },
            )?;
        Ok(Some(record))
    }

    fn invalid_header(&self, reason: &str) -> CacheError {
        CacheError::InvalidHeader {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
