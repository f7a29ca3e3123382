//! Bundled asset access.
//!
//! The host owns the packaged assets (an APK asset manager, a resources
//! directory next to the executable, an embedded blob). The pipeline sees
//! them only through [`AssetSource`], which hands out a reader and its
//! length by logical name.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// An opened bundled asset.
pub struct Asset {
    name: String,
    length: u64,
    reader: Box<dyn Read + Send>,
}

impl Asset {
    /// Wraps a reader as an asset.
    pub fn new(name: impl Into<String>, length: u64, reader: Box<dyn Read + Send>) -> Self {
        Self {
            name: name.into(),
            length,
            reader,
        }
    }

    /// Returns the asset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the asset length in bytes.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Returns true if the asset is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Consumes the asset, returning its reader.
    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.reader
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("name", &self.name)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// Host-supplied access to bundled assets.
pub trait AssetSource: Send + Sync {
    /// Opens an asset by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetNotFound`] if the asset does not exist or
    /// cannot be opened.
    fn open(&self, name: &str) -> Result<Asset>;
}

impl<T: AssetSource + ?Sized> AssetSource for Arc<T> {
    fn open(&self, name: &str) -> Result<Asset> {
        (**self).open(name)
    }
}

// =============================================================================
// Directory-backed source
// =============================================================================

/// Serves assets from files in a directory.
///
/// Asset names are file names relative to the directory. Names with
/// parent or absolute components are treated as missing.
#[derive(Debug, Clone)]
pub struct DirAssetSource {
    dir: PathBuf,
}

impl DirAssetSource {
    /// Creates a source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AssetSource for DirAssetSource {
    fn open(&self, name: &str) -> Result<Asset> {
        let not_found = || Error::AssetNotFound {
            asset: name.to_string(),
        };

        let relative = Path::new(name);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(not_found());
        }

        let file = File::open(self.dir.join(relative)).map_err(|_| not_found())?;
        let meta = file.metadata().map_err(|_| not_found())?;
        if !meta.is_file() {
            return Err(not_found());
        }

        Ok(Asset::new(name, meta.len(), Box::new(file)))
    }
}

// =============================================================================
// In-memory source
// =============================================================================

/// Serves assets from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    assets: HashMap<String, Arc<[u8]>>,
}

impl MemoryAssetSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asset, replacing any existing one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.assets.insert(name.into(), Arc::from(data.into()));
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }
}

/// `Read` over shared bytes.
struct SharedBytes(Arc<[u8]>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AssetSource for MemoryAssetSource {
    fn open(&self, name: &str) -> Result<Asset> {
        let data = self.assets.get(name).ok_or_else(|| Error::AssetNotFound {
            asset: name.to_string(),
        })?;
        let length = data.len() as u64;
        let reader = Cursor::new(SharedBytes(Arc::clone(data)));
        Ok(Asset::new(name, length, Box::new(reader)))
    }
}
