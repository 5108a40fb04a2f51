//! Memoization keyed on file content.
//!
//! A file that is read again with unchanged bytes yields the value built the
//! first time. Once the bytes change, the entry built from the old content is
//! dropped and the value is rebuilt.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// SHA-256 of a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Built values keyed on the hash of the bytes they were built from.
pub struct ContentCache<T> {
    entries: HashMap<ContentHash, Arc<T>>,
    by_path: HashMap<PathBuf, ContentHash>,
}

impl<T> Default for ContentCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            by_path: HashMap::new(),
        }
    }
}

impl<T> ContentCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for the current content of `path`, building it on a miss.
    ///
    /// Failed builds are not stored.
    pub fn get_or_build<F>(&mut self, path: &Path, build: F) -> Result<Arc<T>>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let hash = ContentHash::of(&bytes);

        if let Some(value) = self.entries.get(&hash).cloned() {
            log::debug!("cache hit for {} ({hash})", path.display());
            self.remember(path, hash);
            return Ok(value);
        }

        let value = Arc::new(build(&bytes)?);
        self.entries.insert(hash, Arc::clone(&value));
        self.remember(path, hash);
        Ok(value)
    }

    /// Point `path` at `hash`, dropping the entry for its old content when
    /// nothing else refers to it.
    fn remember(&mut self, path: &Path, hash: ContentHash) {
        if let Some(old) = self.by_path.insert(path.to_path_buf(), hash) {
            if old != hash && !self.by_path.values().any(|h| *h == old) {
                log::debug!("{} changed, dropping entry {old}", path.display());
                self.entries.remove(&old);
            }
        }
    }

    /// Forget whatever was built for `path`.
    pub fn invalidate(&mut self, path: &Path) {
        if let Some(hash) = self.by_path.remove(path) {
            if !self.by_path.values().any(|h| *h == hash) {
                self.entries.remove(&hash);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_path.clear();
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
