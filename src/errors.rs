use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in OtpVault.
#[derive(Debug, Error)]
pub enum OtpVaultError {
    // --- Credential / crypto errors ---
    #[error("Wrong credential — unlock failed")]
    WrongCredential,

    #[error("Integrity check failed — vault contents are tampered or do not match this key")]
    IntegrityFailure,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Container errors ---
    #[error("Corrupt vault file: {0}")]
    CorruptFile(String),

    #[error("Unsupported vault format version {0}")]
    UnsupportedVersion(u8),

    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    // --- Lifecycle / usage errors ---
    #[error("Vault is locked — unlock it first")]
    NotUnlocked,

    #[error("No vault is loaded")]
    NotLoaded,

    #[error("An entry with id {0} already exists")]
    DuplicateId(u64),

    #[error("No entry with id {0}")]
    EntryNotFound(u64),

    #[error("No slot with id {0}")]
    SlotNotFound(u64),

    #[error("Refusing to remove the last slot — the vault could never be unlocked again")]
    CannotRemoveLastSlot,

    // --- Import errors ---
    #[error("No importer recognized the file format")]
    ImportParseFailure,

    // --- OTP errors ---
    #[error("Invalid OTP parameters: {0}")]
    InvalidOtpParams(String),

    // --- Keyring errors ---
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    // --- Audit errors ---
    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for OtpVault results.
pub type Result<T> = std::result::Result<T, OtpVaultError>;
