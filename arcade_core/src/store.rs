//! Local key-value persistence with file locking.
//!
//! The shell persists everything (profile blob, onboarding flag, mock auth
//! records) through an opaque string-keyed store. This implementation keeps
//! one file per key under a data directory, with shared locks for reads and
//! atomic temp-file-then-rename writes for updates.

use crate::Result;
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Keys used by the shell
pub mod keys {
    /// JSON-serialized [`crate::Profile`]
    pub const PROFILE: &str = "profile";
    /// `"true"` sentinel set once the avatar creator has been completed
    pub const HAS_SEEN_AVATAR_CREATOR: &str = "has_seen_avatar_creator";
    /// JSON-serialized authenticated user record (mock auth)
    pub const AUTH_USER: &str = "auth_user";
    /// `"true"` sentinel for the remember-me checkbox (mock auth)
    pub const REMEMBER_ME: &str = "remember_me";
    /// JSON-serialized pending email-verification record (mock auth)
    pub const PENDING_VERIFICATION: &str = "pending_verification";
    /// JSON-serialized list of registered mock users
    pub const MOCK_USERS: &str = "mock_users_db";
}

/// String-keyed byte store used for all durable state
pub trait KvStore {
    /// Read the value for a key; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Durably write the value for a key
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-per-key store rooted at a data directory
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;

        // Shared lock so a concurrent writer cannot hand us a torn value
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        // Write to a unique temp file in the same directory, then rename over
        // the key file so readers only ever see complete values
        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(self.key_path(key))
            .map_err(|e| crate::Error::Io(e.error))?;

        tracing::debug!("Saved key '{}' in {:?}", key, self.dir);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed key '{}' from {:?}", key, self.dir);
        }
        Ok(())
    }
}
