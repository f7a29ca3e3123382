//! Error types for the bootstrap pipeline.

use std::path::PathBuf;

/// Result type alias for bootstrap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while provisioning the sandbox or launching the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Sandbox Errors
    // =========================================================================
    /// Sandbox root is not an absolute path.
    #[error("invalid sandbox root {path}: {reason}")]
    InvalidSandboxRoot { path: PathBuf, reason: String },

    /// A relative path would resolve outside the sandbox root.
    #[error("path escapes sandbox root: {path}")]
    PathOutsideSandbox { path: PathBuf },

    /// Directory could not be created.
    #[error("failed to create directory {path}: {reason}")]
    DirectoryCreateFailed { path: PathBuf, reason: String },

    // =========================================================================
    // Archive Errors
    // =========================================================================
    /// Asset source has no asset with this name.
    #[error("bundled asset not found: {asset}")]
    AssetNotFound { asset: String },

    /// Archive exceeds the size limit.
    #[error("archive '{asset}' exceeds size limit: {size} > {limit} bytes")]
    ArchiveTooLarge { asset: String, size: u64, limit: u64 },

    /// Archive content does not match its declared digest.
    #[error("digest mismatch for '{asset}': expected {expected}, computed {computed}")]
    DigestMismatch {
        asset: String,
        expected: String,
        computed: String,
    },

    /// Archive could not be decoded into its destination.
    #[error("failed to extract '{asset}': {source}")]
    ExtractionFailed {
        asset: String,
        #[source]
        source: DecodeError,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration document could not be written.
    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// One or more configuration documents failed.
    #[error("{} configuration document(s) failed to write", failed.len())]
    ProvisioningIncomplete { failed: Vec<PathBuf> },

    /// Catalog is malformed.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    // =========================================================================
    // Engine Errors
    // =========================================================================
    /// Engine module could not be loaded.
    #[error("failed to load engine module {path}: {reason}")]
    ModuleLoadFailed { path: PathBuf, reason: String },

    /// Engine module does not export the entry symbol.
    #[error("entry symbol '{symbol}' missing from engine module: {reason}")]
    SymbolMissing { symbol: String, reason: String },

    /// Engine thread could not be spawned.
    #[error("failed to spawn engine thread: {0}")]
    SpawnFailed(String),

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors reported by an [`ArchiveDecoder`](crate::archive::ArchiveDecoder).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Stream is not a readable archive.
    #[error("corrupt archive: {0}")]
    Corrupt(String),

    /// Entry path is absolute or contains parent components.
    #[error("path traversal detected in archive entry: {path}")]
    PathTraversal { path: String },

    /// Entry type is not a regular file or directory.
    #[error("unsupported entry type {entry_type} at {path}")]
    UnsafeEntry { entry_type: String, path: String },

    /// Archive has more entries than allowed.
    #[error("archive exceeds maximum entry count ({limit})")]
    TooManyEntries { limit: usize },

    /// Unpacked content exceeds the size limit.
    #[error("unpacked size exceeds limit: {size} > {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    /// Writing an entry failed.
    #[error("failed to unpack {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
