//! # Archive Deployer
//!
//! Extracts bundled archives into their destination directories under the
//! sandbox root. This is the first pipeline stage; everything else depends
//! on the tree it lays down.
//!
//! ## Failure Policy
//!
//! Each archive is an all-or-nothing step and the table is processed
//! fail-fast: the first failure aborts the run and later archives are
//! never opened, so their destination directories are never created.
//! Nothing is cleaned up on failure; a re-run overwrites.
//!
//! ## Integrity
//!
//! An [`ArchiveAsset`] may declare the SHA-256 of its bytes. The archive is
//! then buffered and verified before any entry is unpacked, so a mismatched
//! bundle never touches the sandbox.

use crate::archive::{ArchiveDecoder, UnpackStats};
use crate::asset::AssetSource;
use crate::constants::{
    ADDONS_ARCHIVE, ADDONS_ASSET, ADDONS_DIR, ENGINE_LIBS_ARCHIVE, ENGINE_LIBS_ASSET, LIB_DIR,
    MAX_ARCHIVE_SIZE, USERDATA_ARCHIVE, USERDATA_ASSET, USERDATA_DIR,
};
use crate::error::{DecodeError, Error, Result};
use crate::sandbox::SandboxRoot;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// A bundled archive and where it lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveAsset {
    /// Logical name used in logs and errors.
    pub name: String,
    /// Identifier passed to the [`AssetSource`].
    pub source: String,
    /// Destination directory relative to the sandbox root.
    pub destination: PathBuf,
    /// Expected lowercase hex SHA-256 of the archive bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ArchiveAsset {
    /// Creates an asset entry without a digest.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            destination: destination.into(),
            sha256: None,
        }
    }

    /// Requires the archive bytes to hash to `sha256` (hex).
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into().to_ascii_lowercase());
        self
    }

    /// The three bundles every deployment ships, in extraction order.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(USERDATA_ASSET, USERDATA_ARCHIVE, USERDATA_DIR),
            Self::new(ADDONS_ASSET, ADDONS_ARCHIVE, ADDONS_DIR),
            Self::new(ENGINE_LIBS_ASSET, ENGINE_LIBS_ARCHIVE, LIB_DIR),
        ]
    }
}

/// Extracts bundled archives into the sandbox.
pub struct ArchiveDeployer {
    root: SandboxRoot,
    assets: Arc<dyn AssetSource>,
    decoder: Arc<dyn ArchiveDecoder>,
}

impl ArchiveDeployer {
    /// Creates a deployer.
    pub fn new(
        root: SandboxRoot,
        assets: Arc<dyn AssetSource>,
        decoder: Arc<dyn ArchiveDecoder>,
    ) -> Self {
        Self {
            root,
            assets,
            decoder,
        }
    }

    /// Extracts one archive into its destination.
    ///
    /// # Errors
    ///
    /// - [`Error::PathOutsideSandbox`] if the destination escapes the root
    /// - [`Error::DirectoryCreateFailed`] if the destination cannot be created
    /// - [`Error::AssetNotFound`] if the asset source has no such asset
    /// - [`Error::ArchiveTooLarge`] if the asset exceeds [`MAX_ARCHIVE_SIZE`]
    /// - [`Error::DigestMismatch`] if a declared digest does not match
    /// - [`Error::ExtractionFailed`] if decoding fails
    pub fn deploy(&self, asset: &ArchiveAsset) -> Result<UnpackStats> {
        let dest = self.root.ensure_dir(&asset.destination)?;
        debug!(asset = %asset.name, dest = %dest.display(), "deploying archive");

        let opened = self.assets.open(&asset.source).map_err(|e| match e {
            Error::AssetNotFound { .. } => Error::AssetNotFound {
                asset: asset.name.clone(),
            },
            other => other,
        })?;

        if opened.len() > MAX_ARCHIVE_SIZE {
            return Err(Error::ArchiveTooLarge {
                asset: asset.name.clone(),
                size: opened.len(),
                limit: MAX_ARCHIVE_SIZE,
            });
        }

        let mut reader = opened.into_reader();
        let stats = match &asset.sha256 {
            Some(expected) => {
                let data = read_bounded(&mut reader, &asset.name)?;
                verify_digest(&asset.name, expected, &data)?;
                self.decoder.unpack(&mut &data[..], &dest)
            }
            None => self.decoder.unpack(&mut reader, &dest),
        }
        .map_err(|source| Error::ExtractionFailed {
            asset: asset.name.clone(),
            source,
        })?;

        info!(
            asset = %asset.name,
            files = stats.files,
            bytes = stats.bytes,
            "archive deployed"
        );
        Ok(stats)
    }

    /// Extracts every archive in order, stopping at the first failure.
    pub fn deploy_all(&self, assets: &[ArchiveAsset]) -> Result<Vec<UnpackStats>> {
        let mut deployed = Vec::with_capacity(assets.len());
        for asset in assets {
            deployed.push(self.deploy(asset)?);
        }
        Ok(deployed)
    }
}

/// Reads the whole archive, enforcing [`MAX_ARCHIVE_SIZE`] on actual bytes.
fn read_bounded(reader: &mut dyn Read, name: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader
        .take(MAX_ARCHIVE_SIZE + 1)
        .read_to_end(&mut data)
        .map_err(|e| Error::ExtractionFailed {
            asset: name.to_string(),
            source: DecodeError::Corrupt(format!("failed to read archive: {e}")),
        })?;

    if data.len() as u64 > MAX_ARCHIVE_SIZE {
        return Err(Error::ArchiveTooLarge {
            asset: name.to_string(),
            size: data.len() as u64,
            limit: MAX_ARCHIVE_SIZE,
        });
    }
    Ok(data)
}

fn verify_digest(name: &str, expected: &str, data: &[u8]) -> Result<()> {
    let computed = hex::encode(Sha256::digest(data));
    if !computed.eq_ignore_ascii_case(expected) {
        return Err(Error::DigestMismatch {
            asset: name.to_string(),
            expected: expected.to_string(),
            computed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assets_order() {
        let names: Vec<_> = ArchiveAsset::defaults()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, [USERDATA_ASSET, ADDONS_ASSET, ENGINE_LIBS_ASSET]);
    }

    #[test]
    fn test_verify_digest() {
        let data = b"bundle";
        let digest = hex::encode(Sha256::digest(data));

        assert!(verify_digest("x", &digest, data).is_ok());
        assert!(verify_digest("x", &digest.to_uppercase(), data).is_ok());
        assert!(matches!(
            verify_digest("x", &"0".repeat(64), data),
            Err(Error::DigestMismatch { .. })
        ));
    }
}
