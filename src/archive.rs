//! Archive decoding.
//!
//! [`ArchiveDecoder`] is the seam between the deployer and the byte-level
//! decompression. Three decoders ship with the crate:
//!
//! | Decoder           | Formats                                          |
//! |-------------------|--------------------------------------------------|
//! | [`ZipDecoder`]    | zip (stored or deflated)                         |
//! | [`TarGzDecoder`]  | tar, gzip-compressed or plain                    |
//! | [`BundleDecoder`] | any of the above, picked from the magic bytes    |
//!
//! [`BundleDecoder`] is the pipeline default.
//!
//! ## Security
//!
//! Every entry is checked before it is unpacked:
//! - Absolute paths and `..` components are rejected
//! - Only regular files and directories are unpacked; symlinks, hardlinks
//!   and device nodes are rejected
//! - Entry count is bounded by [`MAX_ARCHIVE_ENTRIES`]
//! - Cumulative unpacked size is bounded by [`MAX_UNPACKED_SIZE`]
//! - Permission bits are masked to `0o777`; setuid, setgid and sticky bits
//!   never reach the sandbox
//!
//! A failure leaves already-unpacked entries in place. Re-running the
//! extraction overwrites them.

use crate::constants::{MAX_ARCHIVE_ENTRIES, MAX_ARCHIVE_SIZE, MAX_UNPACKED_SIZE};
use crate::error::DecodeError;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::{Component, Path};
use tar::{Archive, EntryType};
use tracing::debug;
use zip::ZipArchive;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Zip local file header magic.
const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// Zip end-of-central-directory magic (what an empty zip starts with).
const ZIP_EMPTY_MAGIC: [u8; 4] = *b"PK\x05\x06";

/// Unix file-type mask and regular-file type in zip external attributes.
const S_IFMT: u32 = 0o170_000;
const S_IFREG: u32 = 0o100_000;

/// Counts reported by a successful unpack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackStats {
    /// Regular files written.
    pub files: usize,
    /// Directories created.
    pub directories: usize,
    /// Bytes of file content written.
    pub bytes: u64,
}

/// Decodes an archive stream into a directory.
pub trait ArchiveDecoder: Send + Sync {
    /// Unpacks every entry of `source` under `dest`, preserving relative
    /// paths. `dest` already exists when this is called.
    fn unpack(&self, source: &mut dyn Read, dest: &Path) -> Result<UnpackStats, DecodeError>;
}

/// Tar decoder with transparent gzip support.
#[derive(Debug, Clone)]
pub struct TarGzDecoder {
    max_entries: usize,
    max_unpacked_size: u64,
}

impl Default for TarGzDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TarGzDecoder {
    /// Creates a decoder with the default limits.
    pub fn new() -> Self {
        Self {
            max_entries: MAX_ARCHIVE_ENTRIES,
            max_unpacked_size: MAX_UNPACKED_SIZE,
        }
    }

    /// Overrides the entry and size limits.
    pub fn with_limits(max_entries: usize, max_unpacked_size: u64) -> Self {
        Self {
            max_entries,
            max_unpacked_size,
        }
    }

    fn unpack_tar<R: Read>(&self, reader: R, dest: &Path) -> Result<UnpackStats, DecodeError> {
        let mut archive = Archive::new(reader);
        archive.set_overwrite(true);

        let mut stats = UnpackStats::default();
        let mut entry_count = 0usize;
        let mut total_size = 0u64;

        let entries = archive
            .entries()
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| DecodeError::Corrupt(e.to_string()))?;

            entry_count = entry_count.saturating_add(1);
            if entry_count > self.max_entries {
                return Err(DecodeError::TooManyEntries {
                    limit: self.max_entries,
                });
            }

            let path = entry
                .path()
                .map_err(|e| DecodeError::Corrupt(e.to_string()))?
                .into_owned();
            let path_str = path.to_string_lossy().to_string();

            // SECURITY: Check for path traversal
            validate_entry_path(&path)?;

            let entry_type = entry.header().entry_type();
            match entry_type {
                EntryType::Regular | EntryType::Continuous => {
                    total_size = total_size.saturating_add(entry.size());
                    if total_size > self.max_unpacked_size {
                        return Err(DecodeError::TooLarge {
                            size: total_size,
                            limit: self.max_unpacked_size,
                        });
                    }
                    stats.files += 1;
                    stats.bytes += entry.size();
                }
                EntryType::Directory => stats.directories += 1,
                // Metadata headers are consumed by the tar crate itself.
                EntryType::XHeader | EntryType::XGlobalHeader | EntryType::GNULongName => continue,
                other => {
                    return Err(DecodeError::UnsafeEntry {
                        entry_type: format!("{other:?}"),
                        path: path_str,
                    });
                }
            }

            debug!(entry = %path_str, "unpacking");
            let unpacked = entry.unpack_in(dest).map_err(|source| DecodeError::Io {
                path: path_str.clone(),
                source,
            })?;
            if !unpacked {
                return Err(DecodeError::PathTraversal { path: path_str });
            }
        }

        Ok(stats)
    }
}

impl ArchiveDecoder for TarGzDecoder {
    fn unpack(&self, source: &mut dyn Read, dest: &Path) -> Result<UnpackStats, DecodeError> {
        let mut reader = BufReader::new(source);
        let is_gzip = reader
            .fill_buf()
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?
            .starts_with(&GZIP_MAGIC);

        if is_gzip {
            self.unpack_tar(GzDecoder::new(reader), dest)
        } else {
            self.unpack_tar(reader, dest)
        }
    }
}

// =============================================================================
// Zip
// =============================================================================

/// Zip decoder.
///
/// The central directory sits at the end of a zip, so the stream is
/// buffered in memory (bounded by [`MAX_ARCHIVE_SIZE`]) before any entry is
/// read.
#[derive(Debug, Clone)]
pub struct ZipDecoder {
    max_entries: usize,
    max_unpacked_size: u64,
}

impl Default for ZipDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipDecoder {
    /// Creates a decoder with the default limits.
    pub fn new() -> Self {
        Self::with_limits(MAX_ARCHIVE_ENTRIES, MAX_UNPACKED_SIZE)
    }

    /// Overrides the entry and size limits.
    pub fn with_limits(max_entries: usize, max_unpacked_size: u64) -> Self {
        Self {
            max_entries,
            max_unpacked_size,
        }
    }
}

impl ArchiveDecoder for ZipDecoder {
    fn unpack(&self, source: &mut dyn Read, dest: &Path) -> Result<UnpackStats, DecodeError> {
        let mut data = Vec::new();
        source
            .take(MAX_ARCHIVE_SIZE + 1)
            .read_to_end(&mut data)
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?;
        if data.len() as u64 > MAX_ARCHIVE_SIZE {
            return Err(DecodeError::TooLarge {
                size: data.len() as u64,
                limit: MAX_ARCHIVE_SIZE,
            });
        }

        let mut archive =
            ZipArchive::new(Cursor::new(data)).map_err(|e| DecodeError::Corrupt(e.to_string()))?;
        if archive.len() > self.max_entries {
            return Err(DecodeError::TooManyEntries {
                limit: self.max_entries,
            });
        }

        let mut stats = UnpackStats::default();
        let mut total_size = 0u64;

        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| DecodeError::Corrupt(e.to_string()))?;
            let name = file.name().to_string();

            // SECURITY: Check for path traversal
            validate_entry_path(Path::new(&name))?;
            let relative = file
                .enclosed_name()
                .map(|p| p.to_path_buf())
                .ok_or_else(|| DecodeError::PathTraversal { path: name.clone() })?;
            let target = dest.join(&relative);
            let io_err = |source| DecodeError::Io {
                path: name.clone(),
                source,
            };

            if file.is_dir() {
                fs::create_dir_all(&target).map_err(io_err)?;
                stats.directories += 1;
                continue;
            }

            let file_type = file.unix_mode().map_or(0, |mode| mode & S_IFMT);
            if file_type != 0 && file_type != S_IFREG {
                return Err(DecodeError::UnsafeEntry {
                    entry_type: format!("mode {file_type:o}"),
                    path: name.clone(),
                });
            }

            let declared = file.size();
            total_size = total_size.saturating_add(declared);
            if total_size > self.max_unpacked_size {
                return Err(DecodeError::TooLarge {
                    size: total_size,
                    limit: self.max_unpacked_size,
                });
            }

            debug!(entry = %name, "unpacking");
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
            let mut out = File::create(&target).map_err(io_err)?;
            let written = io::copy(&mut (&mut file).take(declared), &mut out).map_err(io_err)?;

            stats.files += 1;
            stats.bytes += written;
        }

        Ok(stats)
    }
}

// =============================================================================
// Format detection
// =============================================================================

/// Picks [`ZipDecoder`] or [`TarGzDecoder`] from the leading magic bytes.
#[derive(Debug, Clone, Default)]
pub struct BundleDecoder {
    zip: ZipDecoder,
    tar: TarGzDecoder,
}

impl BundleDecoder {
    /// Creates a decoder with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the entry and size limits of both formats.
    pub fn with_limits(max_entries: usize, max_unpacked_size: u64) -> Self {
        Self {
            zip: ZipDecoder::with_limits(max_entries, max_unpacked_size),
            tar: TarGzDecoder::with_limits(max_entries, max_unpacked_size),
        }
    }
}

impl ArchiveDecoder for BundleDecoder {
    fn unpack(&self, source: &mut dyn Read, dest: &Path) -> Result<UnpackStats, DecodeError> {
        let mut reader = BufReader::new(source);
        let head = reader
            .fill_buf()
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?;
        let is_zip = head.starts_with(&ZIP_MAGIC) || head.starts_with(&ZIP_EMPTY_MAGIC);

        if is_zip {
            self.zip.unpack(&mut reader, dest)
        } else {
            self.tar.unpack(&mut reader, dest)
        }
    }
}

/// Rejects absolute entry paths and any non-normal component.
fn validate_entry_path(path: &Path) -> Result<(), DecodeError> {
    let escapes = path.is_absolute()
        || path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

    if escapes {
        return Err(DecodeError::PathTraversal {
            path: path.to_string_lossy().to_string(),
        });
    }
    Ok(())
}
