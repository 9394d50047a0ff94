use std::fs;

use fashion_king::credential::{obfuscate, resolve_api_key, CredentialError, CredentialStore};
use tempfile::tempdir;

#[test]
fn stored_key_is_not_plaintext_and_round_trips() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("credential"));

    store.save("AIzaSyExampleKey123").unwrap();

    let on_disk = fs::read_to_string(store.path()).unwrap();
    assert!(!on_disk.contains("AIzaSyExampleKey123"));
    assert_eq!(on_disk, obfuscate("AIzaSyExampleKey123"));
    assert_eq!(store.load().unwrap().unwrap().as_str(), "AIzaSyExampleKey123");
    assert!(store.has_stored_key());
}

#[test]
fn missing_file_means_no_key() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("absent"));

    assert!(store.load().unwrap().is_none());
    assert!(!store.has_stored_key());
    assert!(store.clear().is_ok());
}

#[test]
fn saving_empty_key_clears_the_slot() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("credential"));
    store.save("secret").unwrap();

    store.save("   ").unwrap();

    assert!(!store.path().exists());
    assert!(store.load().unwrap().is_none());
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credential");
    fs::write(&path, "***not base64***").unwrap();

    let result = CredentialStore::new(&path).load();

    assert!(matches!(result, Err(CredentialError::Corrupt(_))));
}

#[test]
fn configured_key_wins_over_stored_key() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("credential"));
    store.save("stored-key").unwrap();

    assert_eq!(resolve_api_key("env-key", Some(&store)).unwrap().as_str(), "env-key");
    assert_eq!(resolve_api_key("undefined", Some(&store)).unwrap().as_str(), "stored-key");
    assert_eq!(resolve_api_key("", Some(&store)).unwrap().as_str(), "stored-key");
}

#[test]
fn nothing_configured_resolves_to_none() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("credential"));

    assert!(resolve_api_key("", Some(&store)).is_none());
    assert!(resolve_api_key("undefined", None).is_none());
}
