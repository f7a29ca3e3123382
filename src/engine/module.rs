//! Dynamic module loading.
//!
//! [`ModuleLoader`] and [`DynamicModule`] are the seam between the
//! bootstrapper state machine and the platform loader. The native
//! implementation uses `libloading` (`dlopen`/`dlsym` on Unix).
//!
//! ## Handle Lifetime
//!
//! Native libraries are leaked on load and never closed. The engine entry
//! point runs on a detached thread for the rest of the process, and
//! unloading code that thread still executes would be unsound. The same
//! applies after a failed symbol lookup: a partially initialized foreign
//! module is left loaded.
//!
//! ## FFI Safety
//!
//! Loading a library runs its initializers, and calling a resolved symbol
//! trusts that it has the C `main` signature. Both are inherent to loading
//! foreign code; the unsafe blocks document what is assumed.

use crate::error::{Error, Result};
use std::ffi::{CString, c_char, c_int};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Resolved engine entry point.
///
/// Calling it consumes the handle; the argument vector becomes the
/// entry's `argv`.
pub struct EntryPoint {
    symbol: String,
    func: Box<dyn FnOnce(&[String]) -> i32 + Send + 'static>,
}

impl EntryPoint {
    /// Wraps a callable as the entry point for `symbol`.
    pub fn new(
        symbol: impl Into<String>,
        func: impl FnOnce(&[String]) -> i32 + Send + 'static,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            func: Box::new(func),
        }
    }

    /// Returns the symbol this entry point was resolved from.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Invokes the entry point, returning its exit code.
    pub fn call(self, args: &[String]) -> i32 {
        (self.func)(args)
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("symbol", &self.symbol)
            .finish_non_exhaustive()
    }
}

/// A loaded module.
pub trait DynamicModule: Send + Sync {
    /// Path the module was loaded from.
    fn path(&self) -> &Path;

    /// Resolves an exported entry symbol.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SymbolMissing`] if the module does not export it.
    fn resolve(&self, symbol: &str) -> Result<EntryPoint>;
}

/// Loads modules from disk.
pub trait ModuleLoader: Send + Sync {
    /// Loads the module at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModuleLoadFailed`] if the file is missing, built for
    /// another architecture, or has unresolved dependencies.
    fn load(&self, path: &Path) -> Result<Box<dyn DynamicModule>>;
}

// =============================================================================
// Native loader
// =============================================================================

/// C `int main(int argc, char **argv)`.
type CMain = unsafe extern "C" fn(c_int, *mut *mut c_char) -> c_int;

/// Platform dynamic loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeModuleLoader;

impl NativeModuleLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleLoader for NativeModuleLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn DynamicModule>> {
        if !path.is_file() {
            return Err(Error::ModuleLoadFailed {
                path: path.to_path_buf(),
                reason: "module file not found".to_string(),
            });
        }

        // SAFETY: Loading runs the library's initializers. The module is the
        // engine shipped in our own library bundle and is trusted to be
        // well-formed for this platform.
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
            Error::ModuleLoadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        debug!(path = %path.display(), "engine module loaded");
        Ok(Box::new(NativeModule {
            path: path.to_path_buf(),
            library: Box::leak(Box::new(library)),
        }))
    }
}

/// A library loaded for the lifetime of the process.
struct NativeModule {
    path: PathBuf,
    library: &'static libloading::Library,
}

impl DynamicModule for NativeModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn resolve(&self, symbol: &str) -> Result<EntryPoint> {
        // SAFETY: The symbol is assumed to have the C `main` signature. The
        // library is leaked, so the function pointer outlives every caller.
        let main: CMain = unsafe {
            let sym = self
                .library
                .get::<CMain>(symbol.as_bytes())
                .map_err(|e| Error::SymbolMissing {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                })?;
            *sym
        };

        debug!(symbol, path = %self.path.display(), "entry symbol resolved");
        Ok(EntryPoint::new(symbol, move |args| call_c_main(main, args)))
    }
}

/// Calls a C `main` with a NULL-terminated argv built from `args`.
fn call_c_main(main: CMain, args: &[String]) -> i32 {
    let owned: Vec<CString> = match args.iter().map(|a| CString::new(a.as_str())).collect() {
        Ok(owned) => owned,
        Err(e) => {
            error!(error = %e, "engine argument contains an interior NUL");
            return -1;
        }
    };

    let mut argv: Vec<*mut c_char> = owned
        .iter()
        .map(|s| s.as_ptr().cast_mut())
        .chain(std::iter::once(std::ptr::null_mut()))
        .collect();
    let argc = c_int::try_from(owned.len()).unwrap_or(c_int::MAX);

    // SAFETY: `argv` holds `argc` valid NUL-terminated strings followed by a
    // NULL pointer, all alive for the duration of the call.
    unsafe { main(argc, argv.as_mut_ptr()) }
}
