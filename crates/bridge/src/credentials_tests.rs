use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn save_and_load_round_trips() {
    let home = tempdir().unwrap();
    std::env::set_var("HOME", home.path());

    let key = load_or_create_key().unwrap();
    let creds = Credentials { username: "alice".to_string(), password: "hunter2".to_string() };
    save(&creds, &key).unwrap();

    let loaded = load(&key).unwrap();
    assert_eq!(loaded, creds);
}

#[test]
#[serial]
fn key_is_stable_across_loads() {
    let home = tempdir().unwrap();
    std::env::set_var("HOME", home.path());

    let first = load_or_create_key().unwrap();
    let second = load_or_create_key().unwrap();
    assert_eq!(first, second);
}

#[test]
#[serial]
fn wrong_key_fails_to_decrypt() {
    let home = tempdir().unwrap();
    std::env::set_var("HOME", home.path());

    let key = load_or_create_key().unwrap();
    let creds = Credentials { username: "alice".to_string(), password: "hunter2".to_string() };
    save(&creds, &key).unwrap();

    let mut wrong_key = key;
    wrong_key[0] ^= 0xFF;
    assert!(load(&wrong_key).is_err());
}

#[test]
#[serial]
#[cfg(unix)]
fn files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;
    let home = tempdir().unwrap();
    std::env::set_var("HOME", home.path());

    let key = load_or_create_key().unwrap();
    save(&Credentials { username: "a".to_string(), password: "b".to_string() }, &key).unwrap();

    assert_eq!(std::fs::metadata(key_path()).unwrap().permissions().mode() & 0o777, 0o600);
    assert_eq!(std::fs::metadata(credentials_path()).unwrap().permissions().mode() & 0o777, 0o600);
}
