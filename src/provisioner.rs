//! # Configuration Provisioner
//!
//! Writes every document of a [`Catalog`] under the sandbox root, in two
//! ordered phases:
//!
//! 1. **Engine settings**: `userdata/advancedsettings.xml`
//! 2. **Addons and registries**: one settings document per addon, then
//!    `sources.xml` and `favourites.xml`
//!
//! ## Failure Policy
//!
//! Documents are independent of one another, so provisioning is
//! best-effort: a failed write is logged and recorded, and the remaining
//! documents are still written. The run succeeds only if every document
//! was written. This differs from the fail-fast deployer because no
//! document depends on another.

use crate::catalog::{Catalog, ConfigDocument};
use crate::error::{Error, Result};
use crate::sandbox::SandboxRoot;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A document that was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocument {
    /// Root-relative path.
    pub path: PathBuf,
    /// Bytes written.
    pub size: usize,
    /// Lowercase hex SHA-256 of the content.
    pub sha256: String,
}

/// A document that could not be written.
#[derive(Debug)]
pub struct FailedDocument {
    /// Root-relative path.
    pub path: PathBuf,
    /// Why the write failed.
    pub error: Error,
}

/// Outcome of a provisioning run.
#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub written: Vec<WrittenDocument>,
    pub failed: Vec<FailedDocument>,
}

impl ProvisionReport {
    /// Returns true if every document was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Root-relative paths of failed documents.
    pub fn failed_paths(&self) -> Vec<PathBuf> {
        self.failed.iter().map(|f| f.path.clone()).collect()
    }

    /// Converts an incomplete report into [`Error::ProvisioningIncomplete`].
    pub fn into_result(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(Error::ProvisioningIncomplete {
                failed: self.failed_paths(),
            })
        }
    }
}

/// Writes the configuration catalog into the sandbox.
pub struct ConfigProvisioner {
    root: SandboxRoot,
    catalog: Catalog,
}

impl ConfigProvisioner {
    /// Creates a provisioner for `catalog`.
    pub fn new(root: SandboxRoot, catalog: Catalog) -> Self {
        Self { root, catalog }
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Writes every document and returns the full report.
    pub fn provision(&self) -> ProvisionReport {
        let mut report = ProvisionReport::default();

        info!("provisioning engine settings");
        self.write_documents(self.catalog.engine_documents(), &mut report);

        info!(addons = self.catalog.addons.len(), "provisioning addon catalog");
        self.write_documents(self.catalog.addon_documents(), &mut report);

        if report.is_complete() {
            info!(documents = report.written.len(), "configuration provisioned");
        } else {
            warn!(
                written = report.written.len(),
                failed = report.failed.len(),
                "configuration partially provisioned"
            );
        }
        report
    }

    /// Writes every document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProvisioningIncomplete`] listing the failed paths if
    /// any document could not be written. Successful documents stay written.
    pub fn provision_all(&self) -> Result<ProvisionReport> {
        self.provision().into_result()
    }

    fn write_documents(&self, docs: Vec<ConfigDocument>, report: &mut ProvisionReport) {
        for doc in docs {
            match self.root.write_file(&doc.path, doc.contents.as_bytes()) {
                Ok(_) => {
                    debug!(path = %doc.path.display(), "document written");
                    report.written.push(WrittenDocument {
                        sha256: hex::encode(Sha256::digest(doc.contents.as_bytes())),
                        size: doc.contents.len(),
                        path: doc.path,
                    });
                }
                Err(error) => {
                    warn!(path = %doc.path.display(), error = %error, "document write failed");
                    report.failed.push(FailedDocument {
                        path: doc.path,
                        error,
                    });
                }
            }
        }
    }
}
