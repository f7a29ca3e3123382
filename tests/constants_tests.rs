//! Tests for constants module.
//!
//! Validates the on-disk layout contract and that extraction limits are
//! sane relative to each other.

use mediaboot::constants::*;
use std::path::Path;
use std::time::Duration;

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_documents_live_under_userdata() {
    for path in [ADVANCED_SETTINGS_PATH, SOURCES_PATH, FAVOURITES_PATH, ADDON_DATA_DIR] {
        assert!(
            Path::new(path).starts_with(USERDATA_DIR),
            "{path} should be under {USERDATA_DIR}"
        );
    }
}

#[test]
fn test_layout_paths_are_relative() {
    for path in [
        USERDATA_DIR,
        ADDON_DATA_DIR,
        ADDONS_DIR,
        LIB_DIR,
        ADVANCED_SETTINGS_PATH,
        SOURCES_PATH,
        FAVOURITES_PATH,
        ENGINE_MODULE_PATH,
    ] {
        assert!(Path::new(path).is_relative(), "{path} must be root-relative");
        assert!(!path.contains(".."), "{path} must not traverse");
    }
}

#[test]
fn test_engine_module_in_lib_dir() {
    assert!(Path::new(ENGINE_MODULE_PATH).starts_with(LIB_DIR));
}

#[test]
fn test_asset_names_distinct() {
    let archives = [USERDATA_ARCHIVE, ADDONS_ARCHIVE, ENGINE_LIBS_ARCHIVE];
    let names = [USERDATA_ASSET, ADDONS_ASSET, ENGINE_LIBS_ASSET];

    for set in [archives, names] {
        assert_ne!(set[0], set[1]);
        assert_ne!(set[1], set[2]);
        assert_ne!(set[0], set[2]);
    }
}

// =============================================================================
// Size Limit Tests
// =============================================================================

#[test]
fn test_archive_size_reasonable() {
    // Engine library bundles run to a few hundred MiB
    assert!(
        MAX_ARCHIVE_SIZE >= 256 * 1024 * 1024,
        "archive limit too restrictive for engine libraries"
    );
}

#[test]
fn test_unpacked_size_exceeds_archive_size() {
    assert!(
        MAX_UNPACKED_SIZE > MAX_ARCHIVE_SIZE,
        "unpacked limit must leave room for compression"
    );
}

#[test]
fn test_entry_limit_reasonable() {
    assert!(MAX_ARCHIVE_ENTRIES >= 10_000, "addon trees have many files");
    assert!(MAX_ARCHIVE_ENTRIES <= 1_000_000, "entry limit too permissive");
}

// =============================================================================
// Engine Launch Tests
// =============================================================================

#[test]
fn test_engine_args() {
    let args = engine_args();
    assert_eq!(args.len(), 3);
    assert_eq!(args[0], ENGINE_PROGRAM_NAME);
    assert!(args.contains(&ENGINE_WINDOWING_ARG.to_string()));
    assert!(args.contains(&ENGINE_PORTABLE_ARG.to_string()));
}

#[test]
fn test_startup_delay() {
    assert_eq!(ENGINE_STARTUP_DELAY, Duration::from_secs(2));
}

#[test]
fn test_entry_symbol() {
    assert_eq!(ENGINE_ENTRY_SYMBOL, "main");
}
