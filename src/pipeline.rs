//! # Bootstrap Pipeline
//!
//! [`Bootstrap`] is the context object a host builds once and drives
//! through the three stages:
//!
//! ```text
//! extract_assets() ──► provision_configuration() ──► launch_engine()
//!    fail-fast             best-effort                   fail-fast
//! ```
//!
//! Each host entry point returns `bool`, logs failures with the asset name
//! or path involved, and never panics. [`Bootstrap::run`] chains them and
//! stops at the first stage that fails.
//!
//! Everything the stages need (root, asset source, decoder, catalog,
//! engine config, loader) lives on the context, so independent pipelines
//! can coexist in one process as long as their roots differ.

use crate::archive::{ArchiveDecoder, BundleDecoder};
use crate::asset::AssetSource;
use crate::catalog::Catalog;
use crate::deployer::{ArchiveAsset, ArchiveDeployer};
use crate::engine::{EngineBootstrapper, EngineConfig, EngineState, EngineTask, ModuleLoader};
use crate::error::Result;
use crate::provisioner::{ConfigProvisioner, ProvisionReport};
use crate::sandbox::SandboxRoot;
use std::sync::Arc;
use tracing::{error, info};

/// Builder for [`Bootstrap`].
pub struct BootstrapBuilder {
    root: SandboxRoot,
    assets: Arc<dyn AssetSource>,
    decoder: Arc<dyn ArchiveDecoder>,
    archives: Vec<ArchiveAsset>,
    catalog: Catalog,
    engine: EngineConfig,
    loader: Option<Box<dyn ModuleLoader>>,
}

impl BootstrapBuilder {
    /// Uses `decoder` instead of [`BundleDecoder`].
    pub fn decoder(mut self, decoder: Arc<dyn ArchiveDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Replaces the archive table.
    pub fn archives(mut self, archives: Vec<ArchiveAsset>) -> Self {
        self.archives = archives;
        self
    }

    /// Replaces the configuration catalog.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the engine configuration.
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Uses `loader` instead of the platform loader.
    pub fn loader(mut self, loader: Box<dyn ModuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Validates the catalog and builds the pipeline.
    pub fn build(self) -> Result<Bootstrap> {
        self.catalog.validate()?;

        let deployer = ArchiveDeployer::new(self.root.clone(), self.assets, self.decoder);
        let provisioner = ConfigProvisioner::new(self.root.clone(), self.catalog);
        let engine = match self.loader {
            Some(loader) => EngineBootstrapper::new(self.root.clone(), self.engine, loader),
            None => EngineBootstrapper::native(self.root.clone(), self.engine),
        };

        Ok(Bootstrap {
            root: self.root,
            archives: self.archives,
            deployer,
            provisioner,
            engine,
            task: None,
        })
    }
}

/// The provisioning pipeline for one sandbox root.
pub struct Bootstrap {
    root: SandboxRoot,
    archives: Vec<ArchiveAsset>,
    deployer: ArchiveDeployer,
    provisioner: ConfigProvisioner,
    engine: EngineBootstrapper,
    task: Option<EngineTask>,
}

impl Bootstrap {
    /// Starts a builder with the default archive table, the built-in
    /// catalog, the default engine config and the platform loader.
    pub fn builder(root: SandboxRoot, assets: Arc<dyn AssetSource>) -> BootstrapBuilder {
        BootstrapBuilder {
            root,
            assets,
            decoder: Arc::new(BundleDecoder::new()),
            archives: ArchiveAsset::defaults(),
            catalog: Catalog::builtin(),
            engine: EngineConfig::default(),
            loader: None,
        }
    }

    /// Returns the sandbox root.
    pub fn root(&self) -> &SandboxRoot {
        &self.root
    }

    /// Returns the engine state.
    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    /// Takes the engine task handle, if the engine was launched.
    pub fn take_engine_task(&mut self) -> Option<EngineTask> {
        self.task.take()
    }

    // =========================================================================
    // Result-returning stages
    // =========================================================================

    /// Stage 1: extracts every archive, fail-fast.
    pub fn deploy_archives(&self) -> Result<()> {
        self.deployer.deploy_all(&self.archives).map(|_| ())
    }

    /// Stage 2: writes the catalog and returns the report.
    pub fn provision(&self) -> ProvisionReport {
        self.provisioner.provision()
    }

    /// Stage 3: loads and schedules the engine.
    pub fn start_engine(&mut self) -> Result<&EngineTask> {
        let task = self.engine.launch_engine()?;
        Ok(self.task.insert(task))
    }

    // =========================================================================
    // Host entry points
    // =========================================================================

    /// Extracts the bundled archives. Returns false on the first failure.
    pub fn extract_assets(&self) -> bool {
        info!(root = %self.root.path().display(), "extracting bundled assets");
        match self.deploy_archives() {
            Ok(()) => {
                info!("bundled assets extracted");
                true
            }
            Err(e) => {
                error!(error = %e, "asset extraction failed");
                false
            }
        }
    }

    /// Writes every configuration document. Returns false if any failed.
    pub fn provision_configuration(&self) -> bool {
        let report = self.provision();
        for failed in &report.failed {
            error!(
                path = %failed.path.display(),
                error = %failed.error,
                "configuration document failed"
            );
        }
        report.is_complete()
    }

    /// Loads the engine and schedules it. Returns once scheduled.
    pub fn launch_engine(&mut self) -> bool {
        match self.start_engine().map(|_| ()) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, state = %self.engine.state(), "engine launch failed");
                false
            }
        }
    }

    /// Runs all three stages in order, stopping at the first failure.
    pub fn run(&mut self) -> bool {
        self.extract_assets() && self.provision_configuration() && self.launch_engine()
    }
}
