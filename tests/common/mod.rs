//! Shared fixtures: archive builders, asset sources and a fake engine loader.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use mediaboot::constants::{ADDONS_ARCHIVE, ENGINE_LIBS_ARCHIVE, USERDATA_ARCHIVE};
use mediaboot::{DynamicModule, EntryPoint, Error, MemoryAssetSource, ModuleLoader, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tar::{EntryType, Header};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

// =============================================================================
// Archive builders
// =============================================================================

/// Builds an uncompressed tar from `(path, contents)` pairs.
pub fn tar(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data) in entries {
        let mut header = Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

/// Builds a gzip-compressed tar from `(path, contents)` pairs.
pub fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    gzip(&tar(entries))
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Builds a tar.gz with one entry whose name is written verbatim, bypassing
/// the path checks `tar::Builder` applies.
pub fn tar_gz_raw_name(name: &str, data: &[u8]) -> Vec<u8> {
    let mut header = Header::new_old();
    header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_entry_type(EntryType::Regular);
    header.set_cksum();

    let mut builder = tar::Builder::new(Vec::new());
    builder.append(&header, data).unwrap();
    gzip(&builder.into_inner().unwrap())
}

/// Builds a tar.gz holding a single symlink.
pub fn tar_gz_symlink(name: &str, target: &str) -> Vec<u8> {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Symlink);
    header.set_size(0);
    header.set_mode(0o777);
    header.set_link_name(target).unwrap();

    let mut builder = tar::Builder::new(Vec::new());
    builder.append_data(&mut header, name, &[][..]).unwrap();
    gzip(&builder.into_inner().unwrap())
}

/// Builds a deflated zip from `(path, contents)` pairs.
pub fn zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, data) in entries {
        writer.start_file(*path, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Builds a zip holding an explicit directory entry and one file inside it.
pub fn zip_with_directory(dir: &str, file: &str, data: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.add_directory(dir, SimpleFileOptions::default()).unwrap();
    writer
        .start_file(format!("{dir}/{file}"), SimpleFileOptions::default())
        .unwrap();
    writer.write_all(data).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Builds a zip holding a single symlink.
pub fn zip_symlink(name: &str, target: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .add_symlink(name, target, SimpleFileOptions::default())
        .unwrap();
    writer.finish().unwrap().into_inner()
}

// =============================================================================
// Asset fixtures
// =============================================================================

pub fn userdata_bundle() -> Vec<u8> {
    zip(&[
        ("guisettings.xml", b"<settings version=\"2\"></settings>"),
        ("keymaps/remote.xml", b"<keymap />"),
    ])
}

pub fn addons_bundle() -> Vec<u8> {
    zip(&[
        ("skin.estuary/addon.xml", b"<addon id=\"skin.estuary\" />"),
        ("plugin.video.seren/addon.xml", b"<addon id=\"plugin.video.seren\" />"),
    ])
}

pub fn engine_libs_bundle() -> Vec<u8> {
    zip(&[("libkodi.so", b"\x7fELF fake engine")])
}

/// All three bundles, zipped the way they ship.
pub fn full_assets() -> MemoryAssetSource {
    MemoryAssetSource::new()
        .with(USERDATA_ARCHIVE, userdata_bundle())
        .with(ADDONS_ARCHIVE, addons_bundle())
        .with(ENGINE_LIBS_ARCHIVE, engine_libs_bundle())
}

// =============================================================================
// Filesystem helpers
// =============================================================================

/// Reads every file under `root` into a map keyed by relative path.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    collect(root, root, &mut files);
    files
}

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let rel = path.strip_prefix(root).unwrap().to_path_buf();
            files.insert(rel, fs::read(&path).unwrap());
        }
    }
}

// =============================================================================
// Fake engine loader
// =============================================================================

/// Loader double: "loads" any existing file and exports `symbols`.
#[derive(Clone, Default)]
pub struct FakeLoader {
    pub symbols: Vec<String>,
    pub exit_code: i32,
    pub loads: Arc<AtomicUsize>,
    pub calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeLoader {
    pub fn exporting(symbol: &str) -> Self {
        Self {
            symbols: vec![symbol.to_string()],
            ..Self::default()
        }
    }

    pub fn exporting_nothing() -> Self {
        Self::default()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ModuleLoader for FakeLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn DynamicModule>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !path.is_file() {
            return Err(Error::ModuleLoadFailed {
                path: path.to_path_buf(),
                reason: "module file not found".to_string(),
            });
        }
        Ok(Box::new(FakeModule {
            path: path.to_path_buf(),
            loader: self.clone(),
        }))
    }
}

struct FakeModule {
    path: PathBuf,
    loader: FakeLoader,
}

impl DynamicModule for FakeModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn resolve(&self, symbol: &str) -> Result<EntryPoint> {
        if !self.loader.symbols.iter().any(|s| s == symbol) {
            return Err(Error::SymbolMissing {
                symbol: symbol.to_string(),
                reason: "undefined symbol".to_string(),
            });
        }
        let calls = Arc::clone(&self.loader.calls);
        let code = self.loader.exit_code;
        Ok(EntryPoint::new(symbol, move |args| {
            calls.lock().unwrap().push(args.to_vec());
            code
        }))
    }
}
