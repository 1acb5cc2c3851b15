//! Durable blob storage backends
//!
//! - [`FsBlobStore`]: one file per key inside a root directory
//! - [`MemoryBlobStore`]: process-local map, for tests and ephemeral use

use docintel_domain::traits::BlobStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

const TMP_SUFFIX: &str = ".tmp";

fn check_key(key: &str) -> io::Result<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\'])
        && !key.ends_with(TMP_SUFFIX);
    if valid {
        Ok(())
    } else {
        Err(io::Error::new(
            ErrorKind::InvalidInput,
            format!("invalid blob key: {:?}", key),
        ))
    }
}

/// Filesystem blob store rooted at a directory
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for FsBlobStore {
    type Error = io::Error;

    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        check_key(key)?;
        let path = self.root.join(key);
        let tmp = self.root.join(format!("{}{}", key, TMP_SUFFIX));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)
    }

    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        check_key(key)?;
        match fs::read(self.root.join(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn keys(&self) -> io::Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.ends_with(TMP_SUFFIX) {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// In-memory blob store
///
/// Writes can be switched off with [`MemoryBlobStore::set_fail_writes`] to
/// exercise best-effort mirroring.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Remove a blob, returning whether it existed
    pub fn remove(&self, key: &str) -> bool {
        self.blobs.write().remove(key).is_some()
    }
}

impl BlobStore for MemoryBlobStore {
    type Error = io::Error;

    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        check_key(key)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(ErrorKind::Other, "writes disabled"));
        }
        self.blobs.write().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        check_key(key)?;
        Ok(self.blobs.read().get(key).cloned())
    }

    fn keys(&self) -> io::Result<Vec<String>> {
        let mut keys: Vec<String> = self.blobs.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path().join("nested")).unwrap();

        assert_eq!(store.read("a.index").unwrap(), None);
        store.write("a.index", b"hello").unwrap();
        store.write("a_chunks.json", b"[]").unwrap();

        assert_eq!(store.read("a.index").unwrap().as_deref(), Some(&b"hello"[..]));
        assert_eq!(store.keys().unwrap(), vec!["a.index", "a_chunks.json"]);
    }

    #[test]
    fn test_fs_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();
        store.write("k", b"one").unwrap();
        store.write("k", b"two").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some(&b"two"[..]));
    }

    #[test]
    fn test_keys_cannot_escape_root() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();
        assert!(store.write("../evil", b"x").is_err());
        assert!(store.read("a/b").is_err());
        assert!(store.write("", b"x").is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryBlobStore::new();
        store.write("x", b"1").unwrap();
        assert_eq!(store.read("x").unwrap(), Some(b"1".to_vec()));

        store.set_fail_writes(true);
        assert!(store.write("y", b"2").is_err());
        assert_eq!(store.keys().unwrap(), vec!["x"]);

        assert!(store.remove("x"));
        assert_eq!(store.read("x").unwrap(), None);
    }
}
