// src/engine_lib/storage.rs

use std::collections::HashMap;

use crate::error::StorageError;

/// Durable key-value storage holding one string value per key.
pub trait Storage {
    fn read_all(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write_all(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read_all(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read_all(key)
    }

    fn write_all(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write_all(key, value)
    }
}

/// In-process storage. `set_failing(true)` makes every write fail.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    failing: bool,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn read_all(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write_all(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing {
            return Err(StorageError::Rejected { key: key.to_owned() });
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::Storage;
    use crate::error::StorageError;

    /// One `<key>.json` file per key inside `root`.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        root: PathBuf,
    }

    impl FileStorage {
        pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
            let root = root.into();
            fs::create_dir_all(&root).map_err(|source| StorageError::Io {
                key: root.display().to_string(),
                source,
            })?;
            log::debug!("file storage rooted at {}", root.display());
            Ok(Self { root })
        }

        pub fn root(&self) -> &Path {
            &self.root
        }

        fn path_for(&self, key: &str) -> PathBuf {
            let file_name: String = key
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
                .collect();
            self.root.join(format!("{file_name}.json"))
        }
    }

    impl Storage for FileStorage {
        fn read_all(&self, key: &str) -> Result<Option<String>, StorageError> {
            match fs::read_to_string(self.path_for(key)) {
                Ok(raw) => Ok(Some(raw)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(source) => Err(StorageError::Io { key: key.to_owned(), source }),
            }
        }

        fn write_all(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            let target = self.path_for(key);
            let staging = target.with_extension("json.tmp");
            let io_err = |source| StorageError::Io { key: key.to_owned(), source };
            fs::write(&staging, value).map_err(io_err)?;
            fs::rename(&staging, &target).map_err(io_err)
        }
    }

}

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::Storage;
    use crate::error::StorageError;

    /// Browser `localStorage`.
    pub struct LocalStorage {
        inner: web_sys::Storage,
    }

    impl LocalStorage {
        pub fn open() -> Result<Self, StorageError> {
            let inner = web_sys::window()
                .and_then(|win| win.local_storage().ok().flatten())
                .ok_or_else(|| StorageError::Unavailable("localStorage is not accessible".into()))?;
            Ok(Self { inner })
        }
    }

    impl Storage for LocalStorage {
        fn read_all(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner
                .get_item(key)
                .map_err(|_| StorageError::Unavailable(format!("cannot read `{key}`")))
        }

        fn write_all(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner
                .set_item(key, value)
                .map_err(|_| StorageError::Rejected { key: key.to_owned() })
        }
    }
}
