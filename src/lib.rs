//! # mediaboot
//!
//! **First-run provisioning and bootstrap for an embedded media-center engine**
//!
//! This crate materializes a private runtime environment under a sandbox
//! root (directory tree, bundled libraries, addon configuration) from
//! packaged archives, then loads the externally supplied engine module and
//! runs its entry point on a detached thread.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Bootstrap (context)                          │
//! │   extract_assets()  →  provision_configuration()  →  launch_engine()│
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐  ┌──────────────────────┐  ┌───────────────┐  │
//! │  │ ArchiveDeployer  │  │  ConfigProvisioner   │  │    Engine     │  │
//! │  │                  │  │                      │  │ Bootstrapper  │  │
//! │  │ AssetSource      │  │ Catalog → documents  │  │ ModuleLoader  │  │
//! │  │ ArchiveDecoder   │  │ atomic writes        │  │ EngineTask    │  │
//! │  │ fail-fast        │  │ best-effort          │  │ fail-fast     │  │
//! │  └──────────────────┘  └──────────────────────┘  └───────────────┘  │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                SandboxRoot (every write lands here)                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Sandbox Layout
//!
//! | Path                                          | Produced by          |
//! |-----------------------------------------------|----------------------|
//! | `userdata/`                                   | userdata bundle      |
//! | `userdata/advancedsettings.xml`               | provisioner, phase A |
//! | `userdata/addon_data/<id>/settings.xml`       | provisioner, phase B |
//! | `userdata/sources.xml`                        | provisioner, phase B |
//! | `userdata/favourites.xml`                     | provisioner, phase B |
//! | `addons/`                                     | addon bundle         |
//! | `lib/libkodi.so`                              | engine library bundle|
//!
//! # Idempotence
//!
//! Every stage overwrites what it produces. Running the pipeline again
//! against the same root yields byte-identical output, so a failed run is
//! retried wholesale rather than repaired.
//!
//! # Example
//!
//! ```rust,no_run
//! use mediaboot::{Bootstrap, DirAssetSource, SandboxRoot};
//! use std::sync::Arc;
//!
//! fn main() -> mediaboot::Result<()> {
//!     mediaboot::logging::init();
//!
//!     let root = SandboxRoot::new("/data/data/com.example.media/files")?;
//!     let assets = Arc::new(DirAssetSource::new("/opt/media/assets"));
//!     let mut bootstrap = Bootstrap::builder(root, assets).build()?;
//!
//!     if !bootstrap.run() {
//!         eprintln!("bootstrap failed, see log");
//!     }
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod asset;
pub mod catalog;
pub mod constants;
pub mod deployer;
pub mod engine;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod provisioner;
pub mod sandbox;

// Re-exports
pub use archive::{ArchiveDecoder, BundleDecoder, TarGzDecoder, UnpackStats, ZipDecoder};
pub use asset::{Asset, AssetSource, DirAssetSource, MemoryAssetSource};
pub use catalog::{Catalog, ConfigDocument};
pub use deployer::{ArchiveAsset, ArchiveDeployer};
pub use engine::{
    DynamicModule, EngineBootstrapper, EngineConfig, EngineState, EngineTask, EntryPoint,
    ModuleLoader, NativeModuleLoader,
};
pub use error::{DecodeError, Error, Result};
pub use pipeline::{Bootstrap, BootstrapBuilder};
pub use provisioner::{ConfigProvisioner, FailedDocument, ProvisionReport, WrittenDocument};
pub use sandbox::SandboxRoot;
