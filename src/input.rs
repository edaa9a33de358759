//! Whole-file reads of session and Tabs files.

use memmap2::Mmap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Threshold for using memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Errors reading an input file
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The path does not name a regular file
    #[error("{kind} file not found: {}", path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    /// The file exists but could not be read
    #[error("Failed to read {kind} file {}: {source}", path.display())]
    Io {
        kind: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

/// Read a whole input file, memory-mapping large files.
///
/// `kind` names the file in error messages ("session", "tabs").
pub fn read_input(path: &Path, kind: &'static str) -> Result<Vec<u8>, InputError> {
    if !path.is_file() {
        return Err(InputError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    let io_err = |source: io::Error| InputError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    };

    let file_size = fs::metadata(path).map_err(io_err)?.len();
    if file_size > MMAP_THRESHOLD {
        log::debug!("Memory-mapping {kind} file {} ({file_size} bytes)", path.display());
        let file = fs::File::open(path).map_err(io_err)?;
        // SAFETY: the map is copied out immediately and dropped; concurrent
        // truncation by another process is outside what this tool guards against.
        let mmap = unsafe { Mmap::map(&file) }.map_err(io_err)?;
        Ok(mmap.to_vec())
    } else {
        fs::read(path).map_err(io_err)
    }
}
