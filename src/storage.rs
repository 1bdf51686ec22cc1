use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const SHUFFLE_STATE_KEY: &str = ".shuffle-state";

const DOCUMENT_EXTENSION: &str = "json";

pub trait DocumentStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&mut self, key: &str, contents: &str) -> Result<()>;
    /// Removing a missing document succeeds.
    fn delete(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

pub trait SourceProbe {
    fn exists(&self, path: &Path) -> bool;
}

impl<F> SourceProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl SourceProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{DOCUMENT_EXTENSION}"))
    }

    fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))
    }
}

impl DocumentStore for DirectoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.document_path(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        }
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<()> {
        self.ensure_root()?;
        let path = self.document_path(key);
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let path = self.document_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove {}", path.display()))
            }
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let read_dir = match fs::read_dir(&self.root) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to list {}", self.root.display()));
            }
        };

        let mut keys = Vec::new();
        for entry in read_dir {
            let entry =
                entry.with_context(|| format!("failed to list {}", self.root.display()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_document = path
                .extension()
                .is_some_and(|ext| ext == DOCUMENT_EXTENSION);
            if !is_document {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                keys.push(stem.to_string_lossy().to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: BTreeMap<String, String>,
    fail_writes: bool,
    fail_deletes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, key: &str, contents: impl Into<String>) -> Self {
        self.documents.insert(key.to_string(), contents.into());
        self
    }

    pub fn document(&self, key: &str) -> Option<&str> {
        self.documents.get(key).map(String::as_str)
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn set_fail_deletes(&mut self, fail: bool) {
        self.fail_deletes = fail;
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.documents.get(key).cloned())
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<()> {
        if self.fail_writes {
            bail!("write rejected for {key}");
        }
        self.documents.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.fail_deletes {
            bail!("delete rejected for {key}");
        }
        self.documents.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.documents.keys().cloned().collect())
    }
}
