//! The object-store interface the pipeline hands finished files to.
//!
//! The remote transport itself (AWS S3 and its credential handling) lives
//! outside this crate; what the pipeline needs is just `put` and `list`.
//! [`DirStore`] backs the interface with a local directory, which is what
//! field laptops use before a bulk transfer and what the tests use.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub trait ObjectStore {
    /// Upload `local` under `key`.
    fn put(&self, local: &Path, key: &str) -> Result<()>;

    /// Keys currently in the store, sorted.
    fn list(&self) -> Result<Vec<String>>;
}

/// A directory acting as the entry bucket.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for DirStore {
    fn put(&self, local: &Path, key: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating entry store {}", self.root.display()))?;
        fs::copy(local, self.root.join(key))
            .with_context(|| format!("uploading {} as {key}", local.display()))?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in
            fs::read_dir(&self.root).with_context(|| format!("listing {}", self.root.display()))?
        {
            keys.push(entry?.file_name().to_string_lossy().into_owned());
        }
        keys.sort();
        Ok(keys)
    }
}
