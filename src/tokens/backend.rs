//! Secret storage backends.
//!
//! The platform keychain is abstracted as [`SecretBackend`]; the crate ships
//! an encrypted on-disk backend and an in-memory one.

use super::cipher::TokenCipher;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key file name inside the token directory.
const KEY_FILE: &str = "token.key";

/// Key/value secret store.
pub trait SecretBackend: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Remove an entry. Removing a missing entry succeeds.
    fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// Process-local backend, lost on restart.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SecretBackend for MemoryBackend {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// One AES-256-GCM sealed file per entry under a private directory.
pub struct EncryptedFileBackend {
    dir: PathBuf,
    cipher: TokenCipher,
    // Serializes write-then-rename so two writers never interleave temp files.
    write_lock: Mutex<()>,
}

impl EncryptedFileBackend {
    /// Open (or create) the token directory and its key file.
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let cipher = TokenCipher::load_or_create(&dir.join(KEY_FILE))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            cipher,
            write_lock: Mutex::new(()),
        })
    }

    fn entry_path(&self, key: &str) -> anyhow::Result<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            anyhow::bail!("Invalid secret key name: {key:?}");
        }
        Ok(self.dir.join(format!("{key}.enc")))
    }
}

impl SecretBackend for EncryptedFileBackend {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.entry_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(sealed) => Ok(Some(self.cipher.open(&sealed)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.entry_path(key)?;
        let sealed = self.cipher.seal(value)?;

        let _guard = self.write_lock.lock();
        let tmp = path.with_extension("enc.tmp");
        std::fs::write(&tmp, sealed.as_bytes())?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.entry_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
