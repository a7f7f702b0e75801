//! Report package access.
//!
//! A `.pbix` file is a zip archive. The loader only needs two entries, read
//! by name, so packages are abstracted as "read entry as bytes".

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

use super::error::PackageError;

/// Entry holding the layout document.
pub const LAYOUT_ENTRY: &str = "Report/Layout";

/// Entry describing the model the report is bound to.
pub const CONNECTIONS_ENTRY: &str = "Connections";

/// Default cap on the uncompressed size of a single entry.
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 100 * 1024 * 1024;

/// Named-entry access to a report package.
pub trait ReportPackage {
    /// Contents of `name`, or `None` if the package has no such entry.
    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>, PackageError>;
}

/// A report package backed by a zip archive. The file is opened read-only
/// and closed when the package is dropped.
pub struct ZipReportPackage<R: Read + Seek = File> {
    archive: ZipArchive<R>,
    max_entry_bytes: u64,
}

impl ZipReportPackage<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PackageError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PackageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> ZipReportPackage<R> {
    pub fn from_reader(reader: R) -> Result<Self, PackageError> {
        let archive = ZipArchive::new(reader).map_err(|e| PackageError::Archive(e.to_string()))?;
        Ok(Self {
            archive,
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
        })
    }

    /// Refuse entries larger than `limit` bytes once uncompressed.
    pub fn with_max_entry_bytes(mut self, limit: u64) -> Self {
        self.max_entry_bytes = limit;
        self
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.archive.file_names()
    }
}

impl<R: Read + Seek> ReportPackage for ZipReportPackage<R> {
    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>, PackageError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(PackageError::ReadEntry {
                    entry: name.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        let limit = self.max_entry_bytes;
        let too_large = |size| PackageError::EntryTooLarge {
            entry: name.to_string(),
            size,
            limit,
        };
        if file.size() > limit {
            return Err(too_large(file.size()));
        }

        // The header size is not trusted: stop one byte past the limit
        let mut buf = Vec::new();
        file.by_ref()
            .take(limit.saturating_add(1))
            .read_to_end(&mut buf)
            .map_err(|e| PackageError::ReadEntry {
                entry: name.to_string(),
                reason: e.to_string(),
            })?;
        if buf.len() as u64 > limit {
            return Err(too_large(buf.len() as u64));
        }
        Ok(Some(buf))
    }
}

/// An in-memory package.
#[derive(Debug, Clone, Default)]
pub struct MemoryReportPackage {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryReportPackage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(name.into(), bytes.into());
        self
    }

    /// Add a layout entry encoded the way report tools write it (UTF-16LE).
    pub fn with_layout(self, layout: &str) -> Self {
        self.with_entry(LAYOUT_ENTRY, encode_utf16le(layout))
    }
}

impl ReportPackage for MemoryReportPackage {
    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>, PackageError> {
        Ok(self.entries.get(name).cloned())
    }
}

/// Decode layout bytes.
///
/// Layouts are UTF-16LE, usually without a byte-order mark. A UTF-8 BOM or
/// bytes that do not look like UTF-16LE are decoded as UTF-8.
pub fn decode_layout_text(bytes: &[u8]) -> Result<String, String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(rest.to_vec()).map_err(|e| e.to_string());
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16le(rest);
    }
    // ASCII text in UTF-16LE has a zero high byte
    if bytes.len() >= 2 && bytes[1] == 0 {
        return decode_utf16le(bytes);
    }
    String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
}

fn decode_utf16le(bytes: &[u8]) -> Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err(format!("odd byte length {} for UTF-16 text", bytes.len()));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| e.to_string())
}

pub fn encode_utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}
