//! # Engine Bootstrapper
//!
//! Loads the engine module from the sandbox, resolves its entry symbol and
//! runs it on a detached thread after a fixed startup delay.
//!
//! ## State Machine
//!
//! ```text
//!   ┌───────────┐  load   ┌────────┐ resolve ┌────────────────┐ spawn ┌─────────┐
//!   │ NotLoaded │ ──────► │ Loaded │ ──────► │ SymbolResolved │ ────► │ Running │
//!   └─────┬─────┘         └───┬────┘         └────────────────┘       └─────────┘
//!         │ fail              │ fail
//!         ▼                   ▼
//!   ┌────────────┐     ┌───────────────┐
//!   │ LoadFailed │     │ SymbolMissing │
//!   └────────────┘     └───────────────┘
//! ```
//!
//! Failures are terminal and never retried. After `SymbolMissing` the
//! module handle is kept; unloading a partially initialized foreign module
//! is unsafe.
//!
//! ## Scheduling
//!
//! [`EngineBootstrapper::launch_engine`] returns as soon as the engine
//! thread is spawned. The thread sleeps [`EngineConfig::startup_delay`]
//! before calling the entry point, so the caller is back well before the
//! engine starts.
//!
//! ## Limitations
//!
//! Launching is meant to happen once per process. A second call loads the
//! module again and starts a second engine thread; how that interacts with
//! the first is undefined.

mod module;
mod task;

pub use module::{DynamicModule, EntryPoint, ModuleLoader, NativeModuleLoader};
pub use task::EngineTask;

use crate::constants::{ENGINE_ENTRY_SYMBOL, ENGINE_MODULE_PATH, ENGINE_STARTUP_DELAY, engine_args};
use crate::error::Result;
use crate::sandbox::SandboxRoot;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

/// Bootstrapper lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing loaded yet.
    NotLoaded,
    /// Module loaded, entry symbol not resolved.
    Loaded,
    /// Entry symbol resolved, thread not spawned.
    SymbolResolved,
    /// Engine thread spawned.
    Running,
    /// Module could not be loaded.
    LoadFailed,
    /// Module loaded but the entry symbol is missing.
    SymbolMissing,
}

impl EngineState {
    /// Returns true for states no further transition leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Running | Self::LoadFailed | Self::SymbolMissing)
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "not-loaded"),
            Self::Loaded => write!(f, "loaded"),
            Self::SymbolResolved => write!(f, "symbol-resolved"),
            Self::Running => write!(f, "running"),
            Self::LoadFailed => write!(f, "load-failed"),
            Self::SymbolMissing => write!(f, "symbol-missing"),
        }
    }
}

/// Where the engine lives and how it is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Module path relative to the sandbox root.
    pub module_path: PathBuf,
    /// Exported entry symbol.
    pub entry_symbol: String,
    /// Argument vector, `argv[0]` included.
    pub args: Vec<String>,
    /// Delay between spawning the engine thread and calling the entry point.
    pub startup_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from(ENGINE_MODULE_PATH),
            entry_symbol: ENGINE_ENTRY_SYMBOL.to_string(),
            args: engine_args(),
            startup_delay: ENGINE_STARTUP_DELAY,
        }
    }
}

impl EngineConfig {
    /// Overrides the startup delay.
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }
}

/// Drives the engine state machine.
pub struct EngineBootstrapper {
    root: SandboxRoot,
    config: EngineConfig,
    loader: Box<dyn ModuleLoader>,
    state: EngineState,
    /// Kept for the life of the bootstrapper, never unloaded.
    module: Option<Box<dyn DynamicModule>>,
}

impl EngineBootstrapper {
    /// Creates a bootstrapper using `loader`.
    pub fn new(root: SandboxRoot, config: EngineConfig, loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            root,
            config,
            loader,
            state: EngineState::NotLoaded,
            module: None,
        }
    }

    /// Creates a bootstrapper using the platform loader.
    pub fn native(root: SandboxRoot, config: EngineConfig) -> Self {
        Self::new(root, config, Box::new(NativeModuleLoader::new()))
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Loads the module, resolves the entry symbol and schedules the engine.
    ///
    /// Returns once the engine thread is spawned; the entry point is called
    /// after the startup delay, and its exit code is only logged.
    ///
    /// # Errors
    ///
    /// - [`Error::ModuleLoadFailed`](crate::Error::ModuleLoadFailed) (state `LoadFailed`)
    /// - [`Error::SymbolMissing`](crate::Error::SymbolMissing) (state `SymbolMissing`)
    /// - [`Error::SpawnFailed`](crate::Error::SpawnFailed) (state stays `SymbolResolved`)
    pub fn launch_engine(&mut self) -> Result<EngineTask> {
        if self.state != EngineState::NotLoaded {
            warn!(state = %self.state, "engine launch requested more than once");
        }

        let path = match self.root.resolve(&self.config.module_path) {
            Ok(path) => path,
            Err(e) => {
                self.state = EngineState::LoadFailed;
                error!(error = %e, "invalid engine module path");
                return Err(e);
            }
        };

        info!(path = %path.display(), "loading engine module");
        let loaded = match self.loader.load(&path) {
            Ok(module) => module,
            Err(e) => {
                self.state = EngineState::LoadFailed;
                error!(error = %e, "engine module load failed");
                return Err(e);
            }
        };
        self.state = EngineState::Loaded;
        let module = self.module.insert(loaded);

        let entry = match module.resolve(&self.config.entry_symbol) {
            Ok(entry) => entry,
            Err(e) => {
                self.state = EngineState::SymbolMissing;
                error!(error = %e, "engine entry symbol missing");
                return Err(e);
            }
        };
        self.state = EngineState::SymbolResolved;

        let task = EngineTask::spawn(entry, self.config.args.clone(), self.config.startup_delay)
            .inspect_err(|e| error!(error = %e, "engine thread spawn failed"))?;
        self.state = EngineState::Running;

        info!(
            delay_ms = self.config.startup_delay.as_millis() as u64,
            "engine scheduled"
        );
        Ok(task)
    }
}
