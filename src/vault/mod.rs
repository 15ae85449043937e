//! Vault module — encrypted OTP credential storage.
//!
//! This module provides:
//! - `Entry`, `OtpKind`, and `HashAlgorithm` types (`entry`)
//! - HOTP/TOTP code generation (`otp`)
//! - The binary container format (`format`)
//! - The high-level `VaultManager` lifecycle (`manager`)

pub mod entry;
pub mod format;
pub mod manager;
pub mod otp;

// Re-export the most commonly used items.
pub use entry::{Entry, HashAlgorithm, OtpKind};
pub use format::{VaultContainer, VaultHeader};
pub use manager::VaultManager;
