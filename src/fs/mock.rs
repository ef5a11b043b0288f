// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, executable: bool },
    Dir,
}

/// In-memory filesystem for tests. Paths are matched verbatim.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert(
            path.as_ref(),
            MockEntry::File {
                content: content.into(),
                executable: false,
            },
        );
    }

    pub fn add_executable(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert(
            path.as_ref(),
            MockEntry::File {
                content: content.into(),
                executable: true,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir);
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.insert(path.to_path_buf(), entry);
    }

    fn get(&self, path: &Path) -> Option<MockEntry> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.get(path).cloned()
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.get(path) {
            Some(MockEntry::File { content, .. }) => {
                String::from_utf8(content).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(MockEntry::File { .. }))
    }

    fn is_executable(&self, path: &Path) -> bool {
        matches!(
            self.get(path),
            Some(MockEntry::File {
                executable: true,
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_bit_is_tracked_per_file() {
        let fs = MockFileSystem::new();
        fs.add_file("/opt/plain.sh", "echo");
        fs.add_executable("/opt/run.sh", "echo");
        fs.add_dir("/opt");

        assert!(fs.exists(Path::new("/opt/plain.sh")));
        assert!(!fs.is_executable(Path::new("/opt/plain.sh")));
        assert!(fs.is_executable(Path::new("/opt/run.sh")));
        assert!(!fs.is_file(Path::new("/opt")));
        assert!(!fs.is_executable(Path::new("/opt")));
        assert!(fs.read_to_string(Path::new("/missing")).is_err());
    }
}
