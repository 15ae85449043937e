//! Integration tests for the OtpVault vault lifecycle and persistence.

use std::fs;

use otpvault::crypto::{Argon2Params, Credential};
use otpvault::errors::OtpVaultError;
use otpvault::importers::decode_base32_secret;
use otpvault::vault::{Entry, HashAlgorithm, OtpKind, VaultContainer, VaultManager};
use tempfile::TempDir;

/// Helper: create a temporary vault file path inside a fresh temp dir.
fn vault_path() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("test.vault");
    (dir, path)
}

/// Minimum legal Argon2 cost so tests stay fast.
fn test_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

/// Helper: a fresh vault with one password slot for credential `pw`.
fn new_vault(path: &std::path::Path, pw: &[u8]) -> VaultManager {
    let mut manager = VaultManager::create(path).expect("create vault");
    manager
        .add_password_slot(pw, &test_params())
        .expect("add slot");
    manager
}

/// Helper: load a vault and unlock it through its first password slot.
fn reopen(path: &std::path::Path, pw: &[u8]) -> VaultManager {
    let mut manager = VaultManager::new(path);
    manager.load().expect("load vault");
    let slot_id = manager.slots()[0].id();
    manager
        .unlock(slot_id, &Credential::Password(pw))
        .expect("unlock vault");
    manager
}

// ---------------------------------------------------------------------------
// Create, save, lock, reload, unlock round-trip
// ---------------------------------------------------------------------------

#[test]
fn save_lock_reload_unlock_roundtrip() {
    let (_dir, path) = vault_path();

    let mut manager = new_vault(&path, b"p1");

    let mut entry = Entry::totp(
        "alice@example.com",
        "GitHub",
        decode_base32_secret("JBSWY3DPEHPK3PXP").unwrap(),
    );
    entry.id = 1;
    manager.add_key(entry).unwrap();
    manager.save().unwrap();
    manager.lock();
    assert!(manager.is_locked());

    // A completely fresh instance, as after a process restart.
    let manager2 = reopen(&path, b"p1");
    let keys = manager2.keys().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].id, 1);
    assert_eq!(keys[0].name, "alice@example.com");
    assert_eq!(keys[0].issuer, "GitHub");
    assert_eq!(keys[0].kind, OtpKind::Totp { period: 30 });
    assert_eq!(keys[0].digits, 6);
    assert_eq!(keys[0].algorithm, HashAlgorithm::Sha1);
    assert_eq!(
        keys[0].secret,
        decode_base32_secret("JBSWY3DPEHPK3PXP").unwrap()
    );
}

#[test]
fn insertion_order_survives_save_and_reload() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"order-pw");

    for name in ["first", "second", "third"] {
        manager
            .add_key(Entry::totp(name, "Example", b"0123456789".to_vec()))
            .unwrap();
    }
    manager.save().unwrap();

    let manager2 = reopen(&path, b"order-pw");
    let names: Vec<&str> = manager2
        .keys()
        .unwrap()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, ["first", "second", "third"]);
}

// ---------------------------------------------------------------------------
// Wrong credential
// ---------------------------------------------------------------------------

#[test]
fn wrong_password_fails_and_stays_locked() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"correct-pw");
    manager.save().unwrap();

    let mut manager2 = VaultManager::new(&path);
    manager2.load().unwrap();
    let slot_id = manager2.slots()[0].id();

    let result = manager2.unlock(slot_id, &Credential::Password(b"wrong-pw"));
    assert!(matches!(result, Err(OtpVaultError::WrongCredential)));
    assert!(manager2.is_locked());

    // The correct credential still works afterwards.
    manager2
        .unlock(slot_id, &Credential::Password(b"correct-pw"))
        .unwrap();
    assert!(!manager2.is_locked());
}

#[test]
fn unlock_is_idempotent_while_unlocked() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"idem-pw");
    manager.save().unwrap();
    manager.lock();

    let mut manager = reopen(&path, b"idem-pw");
    let slot_id = manager.slots()[0].id();

    // A second unlock is a no-op success, even with a bogus credential.
    manager
        .unlock(slot_id, &Credential::Password(b"anything"))
        .unwrap();
    assert!(!manager.is_locked());
}

// ---------------------------------------------------------------------------
// Mutations while locked
// ---------------------------------------------------------------------------

#[test]
fn mutations_while_locked_fail_and_leave_disk_unchanged() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"locked-pw");
    manager
        .add_key(Entry::totp("a", "X", b"secret".to_vec()))
        .unwrap();
    manager.save().unwrap();
    manager.lock();

    let before = fs::read(&path).unwrap();

    assert!(matches!(
        manager.add_key(Entry::totp("b", "Y", b"secret".to_vec())),
        Err(OtpVaultError::NotUnlocked)
    ));
    assert!(matches!(
        manager.remove_key(1),
        Err(OtpVaultError::NotUnlocked)
    ));
    assert!(matches!(
        manager.swap_keys(1, 2),
        Err(OtpVaultError::NotUnlocked)
    ));
    assert!(matches!(manager.keys(), Err(OtpVaultError::NotUnlocked)));
    assert!(matches!(
        manager.add_password_slot(b"other", &test_params()),
        Err(OtpVaultError::NotUnlocked)
    ));

    // save() while locked is a no-op; the file is untouched.
    manager.save().unwrap();
    assert_eq!(fs::read(&path).unwrap(), before);
}

// ---------------------------------------------------------------------------
// Entry collection invariants
// ---------------------------------------------------------------------------

#[test]
fn duplicate_id_is_rejected() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"dup-pw");

    let mut a = Entry::totp("a", "X", b"secret".to_vec());
    a.id = 7;
    let mut b = Entry::totp("b", "Y", b"secret".to_vec());
    b.id = 7;

    manager.add_key(a).unwrap();
    let result = manager.add_key(b);
    assert!(matches!(result, Err(OtpVaultError::DuplicateId(7))));
    assert_eq!(manager.keys().unwrap().len(), 1);
}

#[test]
fn swap_twice_restores_original_order() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"swap-pw");

    let ids: Vec<u64> = ["a", "b", "c"]
        .iter()
        .map(|name| {
            let entry = Entry::totp(name, "X", b"secret".to_vec());
            let id = entry.id;
            manager.add_key(entry).unwrap();
            id
        })
        .collect();

    let order = |m: &VaultManager| -> Vec<u64> { m.keys().unwrap().iter().map(|e| e.id).collect() };
    let original = order(&manager);

    manager.swap_keys(ids[0], ids[2]).unwrap();
    assert_ne!(order(&manager), original);

    manager.swap_keys(ids[0], ids[2]).unwrap();
    assert_eq!(order(&manager), original);
}

#[test]
fn several_mutations_all_reflected_by_one_save() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"batch-pw");

    let a = Entry::totp("a", "X", b"secret".to_vec());
    let b = Entry::totp("b", "Y", b"secret".to_vec());
    let c = Entry::totp("c", "Z", b"secret".to_vec());
    let (id_a, id_b) = (a.id, b.id);

    manager.add_key(a).unwrap();
    manager.add_key(b).unwrap();
    manager.add_key(c).unwrap();
    manager.remove_key(id_b).unwrap();
    manager.swap_keys(id_a, manager.keys().unwrap()[1].id).unwrap();
    manager.save().unwrap();

    let manager2 = reopen(&path, b"batch-pw");
    let names: Vec<&str> = manager2
        .keys()
        .unwrap()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, ["c", "a"]);
}

// ---------------------------------------------------------------------------
// Slot management
// ---------------------------------------------------------------------------

#[test]
fn removing_one_slot_leaves_the_other_and_the_ciphertext() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"cred-a");
    let slot_b = manager.add_password_slot(b"cred-b", &test_params()).unwrap();
    manager
        .add_key(Entry::totp("alice", "GitHub", b"secret".to_vec()))
        .unwrap();
    manager.save().unwrap();

    let before = VaultContainer::parse(&fs::read(&path).unwrap()).unwrap();
    let slot_a = manager
        .slots()
        .iter()
        .map(|s| s.id())
        .find(|id| *id != slot_b)
        .unwrap();

    manager.remove_slot(slot_a).unwrap();
    manager.save().unwrap();

    // The entries ciphertext is byte-identical; only the slot list changed.
    let after = VaultContainer::parse(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(after.body(), before.body());
    assert_eq!(after.slots().len(), 1);

    // Slot B still unlocks to the identical entries.
    let mut manager2 = VaultManager::new(&path);
    manager2.load().unwrap();
    manager2
        .unlock(slot_b, &Credential::Password(b"cred-b"))
        .unwrap();
    assert_eq!(manager2.keys().unwrap()[0].name, "alice");

    // Slot A is gone.
    let mut manager3 = VaultManager::new(&path);
    manager3.load().unwrap();
    assert!(matches!(
        manager3.unlock(slot_a, &Credential::Password(b"cred-a")),
        Err(OtpVaultError::SlotNotFound(_))
    ));
}

#[test]
fn last_slot_cannot_be_removed() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"only-pw");
    let slot_id = manager.slots()[0].id();

    let result = manager.remove_slot(slot_id);
    assert!(matches!(result, Err(OtpVaultError::CannotRemoveLastSlot)));
    assert_eq!(manager.slots().len(), 1);
}

#[test]
fn replaced_slot_credential_unlocks_after_reload() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"old-password");
    let slot_id = manager.slots()[0].id();
    manager
        .add_key(Entry::totp("alice", "GitHub", b"secret".to_vec()))
        .unwrap();
    manager
        .replace_slot_credential(
            slot_id,
            &Credential::Password(b"old-password"),
            &Credential::Password(b"new-password"),
        )
        .unwrap();
    manager.save().unwrap();

    let mut manager2 = VaultManager::new(&path);
    manager2.load().unwrap();
    assert!(matches!(
        manager2.unlock(slot_id, &Credential::Password(b"old-password")),
        Err(OtpVaultError::WrongCredential)
    ));
    manager2
        .unlock(slot_id, &Credential::Password(b"new-password"))
        .unwrap();
    assert_eq!(manager2.keys().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Corruption and tampering
// ---------------------------------------------------------------------------

#[test]
fn tampered_ciphertext_is_integrity_failure_on_unlock() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"tamper-pw");
    manager
        .add_key(Entry::totp("alice", "GitHub", b"secret".to_vec()))
        .unwrap();
    manager.save().unwrap();

    // Flip a bit in the last byte — inside the body ciphertext.
    let mut data = fs::read(&path).unwrap();
    let last = data.len() - 1;
    data[last] ^= 0x01;
    fs::write(&path, &data).unwrap();

    // The slot still unwraps fine; the body does not.
    let mut manager2 = VaultManager::new(&path);
    manager2.load().unwrap();
    let slot_id = manager2.slots()[0].id();
    let result = manager2.unlock(slot_id, &Credential::Password(b"tamper-pw"));
    assert!(matches!(result, Err(OtpVaultError::IntegrityFailure)));
    assert!(manager2.is_locked());
}

#[test]
fn garbage_file_is_corrupt_not_integrity_failure() {
    let (_dir, path) = vault_path();
    fs::write(&path, b"this is not a vault container at all").unwrap();

    let mut manager = VaultManager::new(&path);
    let result = manager.load();
    assert!(matches!(result, Err(OtpVaultError::CorruptFile(_))));
    assert!(!manager.is_loaded());
}

#[test]
fn unknown_version_is_reported_distinctly() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"ver-pw");
    manager.save().unwrap();

    let mut data = fs::read(&path).unwrap();
    data[4] = 42; // version byte in the envelope prefix
    fs::write(&path, &data).unwrap();

    let mut manager2 = VaultManager::new(&path);
    let result = manager2.load();
    assert!(matches!(result, Err(OtpVaultError::UnsupportedVersion(42))));
}

#[test]
fn missing_file_is_vault_not_found() {
    let (_dir, path) = vault_path();
    let mut manager = VaultManager::new(&path);
    assert!(!manager.file_exists());
    assert!(matches!(
        manager.load(),
        Err(OtpVaultError::VaultNotFound(_))
    ));
}

#[test]
fn create_over_existing_vault_fails() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"first-pw");
    manager.save().unwrap();

    let result = VaultManager::create(&path);
    assert!(matches!(
        result,
        Err(OtpVaultError::VaultAlreadyExists(_))
    ));
}

// ---------------------------------------------------------------------------
// Backup retention
// ---------------------------------------------------------------------------

#[test]
fn save_retains_previous_container_as_backup() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"backup-pw");
    manager.save().unwrap();
    let first = fs::read(&path).unwrap();

    manager
        .add_key(Entry::totp("alice", "GitHub", b"secret".to_vec()))
        .unwrap();
    manager.save().unwrap();

    let backup = manager.backup_path();
    assert!(backup.exists(), "backup file must exist after second save");
    assert_eq!(fs::read(&backup).unwrap(), first);

    // The backup is itself a valid container.
    VaultContainer::parse(&fs::read(&backup).unwrap()).unwrap();
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn encrypted_export_copies_container_verbatim() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"export-pw");
    manager
        .add_key(Entry::totp("alice", "GitHub", b"secret".to_vec()))
        .unwrap();
    manager.save().unwrap();

    let dest = manager.export(true).unwrap();
    assert_ne!(dest, path);
    assert_eq!(fs::read(&dest).unwrap(), fs::read(&path).unwrap());
}

#[test]
fn plain_export_roundtrips_through_parse() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"plain-pw");
    manager
        .add_key(Entry::totp("alice", "GitHub", b"secret".to_vec()))
        .unwrap();
    manager.save().unwrap();

    let dest = manager.export(false).unwrap();
    let container = VaultContainer::parse(&fs::read(&dest).unwrap()).unwrap();
    assert!(!container.is_encrypted());

    let entries = container.plain_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "alice");
}

#[test]
fn plain_export_requires_unlocked_vault() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"lockexp-pw");
    manager.save().unwrap();
    manager.lock();

    let result = manager.export(false);
    assert!(matches!(result, Err(OtpVaultError::NotUnlocked)));

    // Encrypted export still works without a credential.
    manager.export(true).unwrap();
}

// ---------------------------------------------------------------------------
// HOTP counter advance
// ---------------------------------------------------------------------------

#[test]
fn hotp_codes_advance_the_counter_and_persist() {
    let (_dir, path) = vault_path();
    let mut manager = new_vault(&path, b"hotp-pw");

    let entry = Entry::hotp("alice", "GitHub", b"12345678901234567890".to_vec());
    let id = entry.id;
    manager.add_key(entry).unwrap();

    // RFC 4226 vectors for counters 0 and 1.
    assert_eq!(manager.next_code(id, 0).unwrap(), "755224");
    assert_eq!(manager.next_code(id, 0).unwrap(), "287082");
    manager.save().unwrap();

    let mut manager2 = reopen(&path, b"hotp-pw");
    assert_eq!(manager2.next_code(id, 0).unwrap(), "359152");
}
