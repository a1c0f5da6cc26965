//! Filesystem-backed artifact store.
//!
//! Artifacts live in a single flat directory: `<hex128>.<ext>` mains and
//! `<hex128>_thumb.<ext>` thumbnail siblings. Existence is determined purely
//! by filename convention; there is no manifest. Writes publish atomically
//! (temp file, fsync, rename) so a concurrent reader never observes a partial
//! artifact, and deletion is idempotent: absence is success.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Derive the thumbnail sibling name for an artifact
/// (`abc.jpg` -> `abc_thumb.jpg`).
pub fn thumbnail_name(artifact: &str) -> String {
    match artifact.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_thumb.{ext}"),
        None => format!("{artifact}_thumb"),
    }
}

/// A flat-directory key space mapping artifact name to stored bytes.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory itself is created lazily on the first `store` call.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of an artifact inside the store.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write an artifact atomically, creating the root directory if absent.
    ///
    /// The bytes land in a sibling temp file first and are renamed into
    /// place, so a name is either fully present or not present at all.
    pub fn store(&self, name: &str, bytes: &[u8]) -> Result<(), PipelineError> {
        let path = self.checked_path(name)?;
        fs::create_dir_all(&self.root).map_err(|e| storage_error(name, e))?;

        // Artifact names are unique per run, so the temp name is too.
        let tmp = self.root.join(format!("{name}.tmp"));
        let write_result = (|| {
            let mut file = File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        })();

        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp);
            return Err(storage_error(name, e));
        }
        tracing::debug!(artifact = name, bytes = bytes.len(), "stored artifact");
        Ok(())
    }

    /// Read an artifact's bytes. Missing artifacts are `NotFound`.
    pub fn load(&self, name: &str) -> Result<Vec<u8>, PipelineError> {
        let path = self.checked_path(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PipelineError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(storage_error(name, e)),
        }
    }

    /// Whether an artifact with this name exists.
    pub fn exists(&self, name: &str) -> bool {
        self.checked_path(name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Remove an artifact and, if present, its thumbnail sibling.
    ///
    /// Idempotent: a missing main or sibling is success, not `NotFound`.
    /// A real filesystem error on either file is reported as a single
    /// aggregate failure, but whichever half was removed stays removed;
    /// the operation is deliberately not rolled back.
    pub fn delete(&self, name: &str) -> Result<(), PipelineError> {
        let mut failure: Option<io::Error> = None;
        for target in [name.to_string(), thumbnail_name(name)] {
            let path = self.checked_path(&target)?;
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(artifact = %target, "deleted artifact"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(artifact = %target, error = %e, "delete failed");
                    failure = Some(e);
                }
            }
        }
        match failure {
            Some(source) => Err(storage_error(name, source)),
            None => Ok(()),
        }
    }

    /// Resolve a name to a path, rejecting anything that is not a bare
    /// filename. Generated names never trip this; it guards externally
    /// supplied names against path traversal.
    fn checked_path(&self, name: &str) -> Result<PathBuf, PipelineError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(storage_error(
                name,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "artifact names must be bare filenames",
                ),
            ));
        }
        Ok(self.root.join(name))
    }
}

fn storage_error(name: &str, source: io::Error) -> PipelineError {
    PipelineError::Storage {
        name: name.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in_tempdir() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("uploads"));
        (dir, store)
    }

    #[test]
    fn thumbnail_name_inserts_suffix_before_extension() {
        assert_eq!(thumbnail_name("abc123.jpg"), "abc123_thumb.jpg");
        assert_eq!(thumbnail_name("abc123.png"), "abc123_thumb.png");
        assert_eq!(thumbnail_name("no_extension"), "no_extension_thumb");
    }

    #[test]
    fn store_then_load_roundtrips() {
        let (_dir, store) = store_in_tempdir();
        store.store("a.jpg", b"payload").unwrap();
        assert!(store.exists("a.jpg"));
        assert_eq!(store.load("a.jpg").unwrap(), b"payload");
    }

    #[test]
    fn store_creates_the_root_directory() {
        let (_dir, store) = store_in_tempdir();
        assert!(!store.root().exists());
        store.store("a.jpg", b"payload").unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn store_leaves_no_temp_file_behind() {
        let (_dir, store) = store_in_tempdir();
        store.store("a.jpg", b"payload").unwrap();
        let entries: Vec<_> = fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["a.jpg"]);
    }

    #[test]
    fn load_missing_is_not_found() {
        let (_dir, store) = store_in_tempdir();
        match store.load("missing.jpg") {
            Err(PipelineError::NotFound { name }) => assert_eq!(name, "missing.jpg"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, store) = store_in_tempdir();
        store.store("a.jpg", b"payload").unwrap();
        store.delete("a.jpg").unwrap();
        assert!(!store.exists("a.jpg"));
        // second delete of the same name still succeeds
        store.delete("a.jpg").unwrap();
        // and so does deleting something that never existed
        store.delete("never-there.png").unwrap();
    }

    #[test]
    fn delete_removes_the_thumbnail_sibling() {
        let (_dir, store) = store_in_tempdir();
        store.store("a.jpg", b"main").unwrap();
        store.store("a_thumb.jpg", b"thumb").unwrap();
        store.delete("a.jpg").unwrap();
        assert!(!store.exists("a.jpg"));
        assert!(!store.exists("a_thumb.jpg"));
    }

    #[test]
    fn delete_succeeds_when_only_the_main_exists() {
        let (_dir, store) = store_in_tempdir();
        store.store("a.jpg", b"main").unwrap();
        store.delete("a.jpg").unwrap();
        assert!(!store.exists("a.jpg"));
    }

    #[test]
    fn traversal_names_are_rejected() {
        let (_dir, store) = store_in_tempdir();
        assert!(store.store("../escape.jpg", b"x").is_err());
        assert!(store.store("nested/escape.jpg", b"x").is_err());
        assert!(store.load("..").is_err());
        assert!(!store.exists("../escape.jpg"));
    }
}
