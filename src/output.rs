use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::WriteError;

/// Mode for both artifacts: apt reads them as an unprivileged user.
#[cfg(unix)]
const ARTIFACT_MODE: u32 = 0o644;

/// Replaces `path` with `contents` through a temp file in the same
/// directory, so readers see either the old file or the complete new one.
pub fn replace_file(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let fail = |source| WriteError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(fail)?;
    debug!("Staging {} via {}", path.display(), tmp.path().display());

    tmp.write_all(contents).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;
    set_artifact_permissions(tmp.path()).map_err(fail)?;

    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_artifact_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(ARTIFACT_MODE))
}

#[cfg(not(unix))]
fn set_artifact_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
