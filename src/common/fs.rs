//! Output-path helpers.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};

/// Refuse to clobber an existing output unless `force` is set, and create
/// missing parent directories.
pub(crate) fn prepare_output(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("output {} already exists (pass force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }
    }
    Ok(())
}
