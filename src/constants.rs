//! # Bootstrap Constants
//!
//! Sandbox layout, bundled asset names, engine launch parameters and the
//! extraction limits used by the archive decoder. These constants are the
//! single source of truth for paths that other tooling depends on, so
//! changing any of them changes the on-disk contract.
//!
//! ## Layout
//!
//! ```text
//! <sandbox root>/
//! ├── userdata/                      (userdata bundle)
//! │   ├── advancedsettings.xml
//! │   ├── sources.xml
//! │   ├── favourites.xml
//! │   └── addon_data/<addon-id>/settings.xml
//! ├── addons/                        (addon bundle)
//! └── lib/                           (engine library bundle)
//!     └── libkodi.so
//! ```

use std::time::Duration;

// =============================================================================
// Sandbox Layout
// =============================================================================

/// Directory receiving the userdata bundle and the generated registries.
pub const USERDATA_DIR: &str = "userdata";

/// Directory holding one settings directory per catalog addon.
pub const ADDON_DATA_DIR: &str = "userdata/addon_data";

/// Directory receiving the addon bundle.
pub const ADDONS_DIR: &str = "addons";

/// Directory receiving the engine library bundle.
pub const LIB_DIR: &str = "lib";

/// Engine-wide settings document.
pub const ADVANCED_SETTINGS_PATH: &str = "userdata/advancedsettings.xml";

/// Source-repository registry document.
pub const SOURCES_PATH: &str = "userdata/sources.xml";

/// Shortcut registry document.
pub const FAVOURITES_PATH: &str = "userdata/favourites.xml";

/// File name of every per-addon settings document.
pub const ADDON_SETTINGS_FILE: &str = "settings.xml";

// =============================================================================
// Bundled Assets
// =============================================================================

/// Logical name of the userdata bundle.
pub const USERDATA_ASSET: &str = "userdata";

/// Logical name of the addon bundle.
pub const ADDONS_ASSET: &str = "addons";

/// Logical name of the engine library bundle.
pub const ENGINE_LIBS_ASSET: &str = "engine-libs";

/// Asset-source identifier of the userdata bundle.
pub const USERDATA_ARCHIVE: &str = "diggz_userdata.zip";

/// Asset-source identifier of the addon bundle.
pub const ADDONS_ARCHIVE: &str = "diggz_addons.zip";

/// Asset-source identifier of the engine library bundle.
pub const ENGINE_LIBS_ARCHIVE: &str = "kodi_libs.zip";

// =============================================================================
// Extraction Limits
// =============================================================================
//
// Bundles ship with the application, but they are still parsed from bytes we
// did not produce at runtime. The limits below bound disk and inode usage if
// a bundle is corrupted or replaced.
// =============================================================================

/// Maximum size of a single bundled archive (1 GiB).
///
/// Checked against the length reported by the asset source before any bytes
/// are read.
pub const MAX_ARCHIVE_SIZE: u64 = 1024 * 1024 * 1024;

/// Maximum total unpacked size of a single archive (4 GiB).
///
/// **Attack Vector**: Compression bombs (small compressed, huge uncompressed).
pub const MAX_UNPACKED_SIZE: u64 = 4 * 1024 * 1024 * 1024;

/// Maximum number of entries in a single archive.
///
/// An engine library bundle plus a full addon tree stays well under this.
pub const MAX_ARCHIVE_ENTRIES: usize = 200_000;

// =============================================================================
// Engine Launch
// =============================================================================

/// Engine module path relative to the sandbox root.
pub const ENGINE_MODULE_PATH: &str = "lib/libkodi.so";

/// Entry symbol the engine module must export (`int main(int, char **)`).
pub const ENGINE_ENTRY_SYMBOL: &str = "main";

/// Program-name placeholder passed as `argv[0]`.
pub const ENGINE_PROGRAM_NAME: &str = "kodi";

/// Windowing backend selector.
pub const ENGINE_WINDOWING_ARG: &str = "--windowing=android";

/// Keeps all engine state under the sandbox root.
pub const ENGINE_PORTABLE_ARG: &str = "--portable";

/// Delay between scheduling the engine thread and calling its entry point.
pub const ENGINE_STARTUP_DELAY: Duration = Duration::from_secs(2);

/// Name given to the detached engine thread.
pub const ENGINE_THREAD_NAME: &str = "engine-main";

/// Returns the fixed engine argument vector.
pub fn engine_args() -> Vec<String> {
    vec![
        ENGINE_PROGRAM_NAME.to_string(),
        ENGINE_WINDOWING_ARG.to_string(),
        ENGINE_PORTABLE_ARG.to_string(),
    ]
}

// =============================================================================
// Logging
// =============================================================================

/// Environment variable read by [`crate::logging::init`].
pub const LOG_FILTER_ENV: &str = "MEDIABOOT_LOG";

/// Filter used when [`LOG_FILTER_ENV`] is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";
