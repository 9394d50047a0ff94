//! Locally stored AI credential.
//!
//! The key is XOR-ed with a fixed salt and base64 encoded so it is not readable at a
//! glance. This is obfuscation only and offers no protection against anyone who can
//! read the file and this source.

use std::{fs, io, path::{Path, PathBuf}};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use derive_more::Display;
use zeroize::Zeroizing;

const SECRET_SALT: &[u8] = b"fashion_king_secret_salt_2024";

#[derive(Debug, Display)]
pub enum CredentialError {
    #[display("Credential file error: {_0}")]
    Io(String),

    #[display("Stored credential is corrupt: {_0}")]
    Corrupt(String),
}

impl std::error::Error for CredentialError {}

impl From<io::Error> for CredentialError {
    fn from(err: io::Error) -> Self {
        CredentialError::Io(err.to_string())
    }
}

fn xor_with_salt(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(SECRET_SALT.iter().cycle())
        .map(|(b, s)| b ^ s)
        .collect()
}

pub fn obfuscate(api_key: &str) -> String {
    let mixed = Zeroizing::new(xor_with_salt(api_key.as_bytes()));
    STANDARD.encode(mixed.as_slice())
}

pub fn deobfuscate(encoded: &str) -> Result<Zeroizing<String>, CredentialError> {
    let mixed = Zeroizing::new(
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| CredentialError::Corrupt(e.to_string()))?,
    );
    let plain = xor_with_salt(&mixed);
    String::from_utf8(plain)
        .map(Zeroizing::new)
        .map_err(|e| CredentialError::Corrupt(e.to_string()))
}

/// Single credential slot backed by a file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores the key. An empty key clears the slot.
    pub fn save(&self, api_key: &str) -> Result<(), CredentialError> {
        if api_key.trim().is_empty() {
            return self.clear();
        }
        fs::write(&self.path, obfuscate(api_key.trim()))?;
        Ok(())
    }

    pub fn load(&self) -> Result<Option<Zeroizing<String>>, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(encoded) if encoded.trim().is_empty() => Ok(None),
            Ok(encoded) => deobfuscate(&encoded).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn has_stored_key(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() > 0).unwrap_or(false)
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Picks the configured key, falling back to the stored one.
///
/// Blank values and the literal `"undefined"` left behind by build-time injection
/// count as missing.
pub fn resolve_api_key(configured: &str, store: Option<&CredentialStore>) -> Option<Zeroizing<String>> {
    let configured = configured.trim();
    if !configured.is_empty() && configured != "undefined" {
        return Some(Zeroizing::new(configured.to_string()));
    }

    let store = store?;
    match store.load() {
        Ok(key) => key.filter(|k| !k.trim().is_empty()),
        Err(e) => {
            tracing::error!("Failed to read stored credential at {}: {}", store.path().display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obfuscation_round_trips() {
        let encoded = obfuscate("AIzaSy-test-key");
        assert_ne!(encoded, "AIzaSy-test-key");
        assert!(!encoded.contains("AIza"));
        assert_eq!(deobfuscate(&encoded).unwrap().as_str(), "AIzaSy-test-key");
    }

    #[test]
    fn keys_longer_than_salt_wrap_around() {
        let key = "k".repeat(SECRET_SALT.len() * 3 + 1);
        assert_eq!(deobfuscate(&obfuscate(&key)).unwrap().as_str(), key);
    }

    #[test]
    fn corrupt_payload_is_reported() {
        assert!(matches!(deobfuscate("%%%"), Err(CredentialError::Corrupt(_))));
    }

    #[test]
    fn undefined_counts_as_missing() {
        assert!(resolve_api_key("undefined", None).is_none());
        assert!(resolve_api_key("  ", None).is_none());
        assert_eq!(resolve_api_key("abc", None).unwrap().as_str(), "abc");
    }
}
