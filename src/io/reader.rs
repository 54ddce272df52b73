//! Document input and segment output.
//!
//! A document comes from a file or from standard input (`-`). Files at or
//! above [`MMAP_THRESHOLD`] are memory mapped instead of buffered, so a large
//! manuscript is decoded straight from the page cache.

// Mapping is read-only and the map never outlives the reader
#![allow(unsafe_code)]

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::core::Segment;
use crate::error::{IoError, Result};
use crate::io::unicode::validate_utf8;

/// Size at which files are memory mapped (1 MiB).
pub const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Largest accepted input (1 GiB).
const MAX_INPUT_BYTES: u64 = 1024 * 1024 * 1024;

/// Path value that selects standard input.
pub const STDIN_PATH: &str = "-";

/// Where a document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input.
    Stdin,
    /// A file on disk.
    File(PathBuf),
}

impl InputSource {
    /// Resolves a command-line path, treating `-` as standard input.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        if path.as_os_str() == STDIN_PATH {
            Self::Stdin
        } else {
            Self::File(path.to_path_buf())
        }
    }

    /// Reads the whole document as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or is not valid UTF-8.
    pub fn read(&self) -> Result<String> {
        match self {
            Self::Stdin => read_capped(io::stdin().lock(), &self.to_string(), MAX_INPUT_BYTES),
            Self::File(path) => DocumentReader::open(path)?.read_to_string(),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How a file's bytes are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Read into an owned buffer.
    Buffered,
    /// Memory mapped.
    Mapped,
}

impl ReadMode {
    /// Picks the mode for a file of `size` bytes.
    #[must_use]
    pub const fn for_size(size: u64) -> Self {
        if size >= MMAP_THRESHOLD {
            Self::Mapped
        } else {
            Self::Buffered
        }
    }
}

/// An opened document file.
///
/// # Examples
///
/// ```no_run
/// use chunkstream::io::DocumentReader;
///
/// let reader = DocumentReader::open("manuscript.txt".as_ref()).unwrap();
/// let text = reader.read_to_string().unwrap();
/// ```
#[derive(Debug)]
pub struct DocumentReader {
    file: File,
    size: u64,
    label: String,
}

impl DocumentReader {
    /// Opens a document, rejecting inputs over 1 GiB.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FileNotFound`] for a missing file and
    /// [`IoError::ReadFailed`] for any other open failure.
    pub fn open(path: &Path) -> Result<Self> {
        let label = path.display().to_string();

        let file = File::open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                IoError::FileNotFound {
                    path: label.clone(),
                }
            } else {
                IoError::ReadFailed {
                    path: label.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let size = file
            .metadata()
            .map_err(|e| IoError::ReadFailed {
                path: label.clone(),
                reason: e.to_string(),
            })?
            .len();

        if size > MAX_INPUT_BYTES {
            return Err(IoError::ReadFailed {
                path: label,
                reason: format!("input is {size} bytes, limit is {MAX_INPUT_BYTES}"),
            }
            .into());
        }

        Ok(Self { file, size, label })
    }

    /// Size of the file in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size
    }

    /// The mode [`read_to_string`](Self::read_to_string) will use.
    #[must_use]
    pub const fn mode(&self) -> ReadMode {
        ReadMode::for_size(self.size)
    }

    /// Reads and decodes the document.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or mapping fails, or the content is not
    /// valid UTF-8.
    pub fn read_to_string(&self) -> Result<String> {
        let mode = self.mode();
        debug!(path = %self.label, bytes = self.size, ?mode, "reading document");

        match mode {
            ReadMode::Mapped => {
                let map = unsafe { Mmap::map(&self.file) }.map_err(|e| IoError::MmapFailed {
                    path: self.label.clone(),
                    reason: e.to_string(),
                })?;
                validate_utf8(&map)
                    .map(str::to_string)
                    .map_err(|offset| invalid_utf8(&self.label, offset))
            }
            ReadMode::Buffered => {
                let mut bytes = Vec::with_capacity(usize::try_from(self.size).unwrap_or(0));
                (&self.file)
                    .read_to_end(&mut bytes)
                    .map_err(|e| IoError::ReadFailed {
                        path: self.label.clone(),
                        reason: e.to_string(),
                    })?;
                decode_owned(bytes, &self.label)
            }
        }
    }
}

/// Reads a stream to the end, rejecting more than `limit` bytes.
fn read_capped<R: Read>(reader: R, label: &str, limit: u64) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| IoError::ReadFailed {
            path: label.to_string(),
            reason: e.to_string(),
        })?;

    if bytes.len() as u64 > limit {
        return Err(IoError::ReadFailed {
            path: label.to_string(),
            reason: format!("input exceeds limit of {limit} bytes"),
        }
        .into());
    }
    decode_owned(bytes, label)
}

fn decode_owned(bytes: Vec<u8>, label: &str) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| invalid_utf8(label, e.utf8_error().valid_up_to()))
}

fn invalid_utf8(label: &str, offset: usize) -> crate::Error {
    IoError::ReadFailed {
        path: label.to_string(),
        reason: format!("invalid UTF-8 at byte offset {offset}"),
    }
    .into()
}

/// Reads a document from a path, or from standard input when the path is `-`.
///
/// # Errors
///
/// Returns an error if reading fails or the input is not valid UTF-8.
pub fn read_input<P: AsRef<Path>>(path: P) -> Result<String> {
    InputSource::from_path(path.as_ref()).read()
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        IoError::DirectoryFailed {
            path: dir.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Writes text to a file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if directory creation or the write fails.
pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_dir(parent)?;
    }

    std::fs::write(path, content).map_err(|e| {
        IoError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Returns the file name used for a segment: `{prefix}_{index:04}.txt`.
#[must_use]
pub fn segment_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index:04}.txt")
}

/// Writes each segment to its own file under `out_dir`.
///
/// Returns the written paths in segment order.
///
/// # Errors
///
/// Returns an error if directory creation or any write fails.
pub fn write_segments<P: AsRef<Path>>(
    out_dir: P,
    segments: &[Segment],
    prefix: &str,
) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    ensure_dir(out_dir)?;

    segments
        .iter()
        .map(|segment| {
            let path = out_dir.join(segment_file_name(prefix, segment.index));
            write_file(&path, &segment.content)?;
            Ok(path)
        })
        .collect()
}
