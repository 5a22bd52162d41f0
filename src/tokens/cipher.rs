//! AES-256-GCM sealing for values kept in the token directory.
//!
//! Sealed format: `aes256:<base64(nonce ‖ ciphertext)>`.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use std::path::Path;

/// Nonce size for AES-256-GCM (12 bytes / 96 bits).
const NONCE_SIZE: usize = 12;

/// Prefix marking a sealed value.
const SEALED_PREFIX: &str = "aes256:";

/// Symmetric cipher bound to a single 256-bit key.
pub struct TokenCipher {
    key: [u8; 32],
}

impl TokenCipher {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Load the key from `path`, or generate and persist a fresh one when
    /// the file does not exist yet.
    pub fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let key_bytes = std::fs::read(path)?;
            if key_bytes.len() != 32 {
                anyhow::bail!(
                    "Token key must be exactly 32 bytes, got {}",
                    key_bytes.len()
                );
            }
            let mut key = [0u8; 32];
            key.copy_from_slice(&key_bytes);
            return Ok(Self { key });
        }

        let generated = Aes256Gcm::generate_key(OsRng);
        let mut key = [0u8; 32];
        key.copy_from_slice(generated.as_slice());
        write_key_file(path, &key)?;
        tracing::info!(path = %path.display(), "Generated new token encryption key");
        Ok(Self { key })
    }

    pub fn seal(&self, plaintext: &str) -> anyhow::Result<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| anyhow::anyhow!("AES cipher init failed: {e}"))?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| anyhow::anyhow!("AES encryption failed: {e}"))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(nonce.as_slice());
        combined.extend_from_slice(&ciphertext);

        let encoded = base64::engine::general_purpose::STANDARD.encode(&combined);
        Ok(format!("{SEALED_PREFIX}{encoded}"))
    }

    pub fn open(&self, sealed: &str) -> anyhow::Result<String> {
        let encoded = sealed
            .trim()
            .strip_prefix(SEALED_PREFIX)
            .ok_or_else(|| anyhow::anyhow!("Missing AES-256-GCM prefix"))?;
        let combined = base64::engine::general_purpose::STANDARD.decode(encoded)?;

        if combined.len() < NONCE_SIZE {
            anyhow::bail!("Ciphertext too short");
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| anyhow::anyhow!("AES cipher init failed: {e}"))?;
        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| anyhow::anyhow!("AES decryption failed: {e}"))?;

        String::from_utf8(plaintext).map_err(|e| anyhow::anyhow!("Invalid UTF-8 in plaintext: {e}"))
    }
}

/// Create the key file owner-only from the start; never overwrite.
fn write_key_file(path: &Path, key: &[u8; 32]) -> anyhow::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(key)?;
    file.sync_all()?;
    Ok(())
}
