//! Importer for OtpVault's own plaintext container format.
//!
//! Re-imports the output of a plaintext export.  Encrypted containers
//! are rejected here — importing one would need a credential prompt,
//! which is the caller's business, not the registry's.

use super::Importer;
use crate::errors::{OtpVaultError, Result};
use crate::vault::{Entry, VaultContainer};

pub struct VaultPlainImporter;

impl Importer for VaultPlainImporter {
    fn name(&self) -> &'static str {
        "otpvault-plain"
    }

    fn convert(&self, data: &[u8]) -> Result<Vec<Entry>> {
        let container = VaultContainer::parse(data)?;
        if container.is_encrypted() {
            return Err(OtpVaultError::ImportParseFailure);
        }

        container.plain_entries()
    }
}
