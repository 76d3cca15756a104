use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::ExportError;

/// Write `content` to a temporary file next to `path`, sync it, then rename
/// it over `path`
///
/// Parent directories are created when missing. The temporary file is
/// removed if any step fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), ExportError> {
    let write_error = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = parent_dir(path);
    if !parent.exists() {
        fs::create_dir_all(&parent).map_err(write_error)?;
    }

    let mut file = NamedTempFile::new_in(&parent).map_err(write_error)?;
    file.write_all(content).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;

    // Make the rename itself durable
    #[cfg(unix)]
    if let Ok(dir) = fs::File::open(&parent) {
        let _ = dir.sync_all();
    }

    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
