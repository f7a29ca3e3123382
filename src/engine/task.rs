//! Detached engine execution.

use super::module::EntryPoint;
use crate::constants::ENGINE_THREAD_NAME;
use crate::error::{Error, Result};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Handle to the engine thread.
///
/// The engine is fire-and-forget: there is no cancellation, and its exit
/// code is only logged. Dropping the handle detaches the thread. Callers
/// that want lifecycle control can poll [`is_finished`](Self::is_finished)
/// or [`join`](Self::join), which blocks until the entry point returns
/// (normally never).
#[derive(Debug)]
pub struct EngineTask {
    handle: JoinHandle<i32>,
    scheduled_at: Instant,
    startup_delay: Duration,
}

impl EngineTask {
    /// Spawns a thread that sleeps `startup_delay`, then calls `entry`.
    pub(crate) fn spawn(
        entry: EntryPoint,
        args: Vec<String>,
        startup_delay: Duration,
    ) -> Result<Self> {
        let symbol = entry.symbol().to_string();
        let handle = thread::Builder::new()
            .name(ENGINE_THREAD_NAME.to_string())
            .spawn(move || {
                thread::sleep(startup_delay);
                info!(symbol = %symbol, args = ?args, "calling engine entry point");
                let code = entry.call(&args);
                if code == 0 {
                    info!(code, "engine entry point returned");
                } else {
                    warn!(code, "engine entry point returned non-zero");
                }
                code
            })
            .map_err(|e| Error::SpawnFailed(e.to_string()))?;

        Ok(Self {
            handle,
            scheduled_at: Instant::now(),
            startup_delay,
        })
    }

    /// Returns true once the entry point has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// When the thread was scheduled.
    pub fn scheduled_at(&self) -> Instant {
        self.scheduled_at
    }

    /// Delay before the entry point is called.
    pub fn startup_delay(&self) -> Duration {
        self.startup_delay
    }

    /// Blocks until the entry point returns. `None` if it panicked.
    pub fn join(self) -> Option<i32> {
        self.handle.join().ok()
    }

    /// Lets the engine run unobserved.
    pub fn detach(self) {
        drop(self.handle);
    }
}
