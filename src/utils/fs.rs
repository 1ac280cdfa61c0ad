//! Filesystem helpers for writing the lab tree.

use crate::error::{ConvertError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Replace `path` with `content` through a temporary file in the same
/// directory, so an interrupted run never leaves a half-written file.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ConvertError::io(dir, e))?;
    temp.write_all(content).map_err(|e| ConvertError::io(temp.path(), e))?;
    temp.as_file().sync_all().map_err(|e| ConvertError::io(temp.path(), e))?;
    temp.persist(path).map_err(|e| ConvertError::io(path, e.error))?;
    Ok(())
}

/// Recursively copy `src` into `dst`, replacing any previous copy
pub fn replace_dir(src: &Path, dst: &Path) -> Result<()> {
    if dst.exists() {
        fs::remove_dir_all(dst).map_err(|e| ConvertError::io(dst, e))?;
    }
    copy_dir(src, dst)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| ConvertError::io(dst, e))?;

    for entry in fs::read_dir(src).map_err(|e| ConvertError::io(src, e))? {
        let entry = entry.map_err(|e| ConvertError::io(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| ConvertError::io(&from, e))?;

        if file_type.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| ConvertError::io(&from, e))?;
        }
    }
    Ok(())
}

/// Mark a generated script executable
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path).map_err(|e| ConvertError::io(path, e))?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).map_err(|e| ConvertError::io(path, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
