//! Collision-avoiding allocation of the run's artifact directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

/// Returns a directory the run may treat as exclusively its own.
///
/// Preference order:
/// 1. `base/run_name`, reused only when it already exists and is empty;
/// 2. `base/save/run_name` when unused;
/// 3. `base/save/run_name-2`, `-3`, ... until an unused name is found.
///
/// The returned directory exists on success. Creation failure is fatal;
/// there is no silent fallback location.
pub fn allocate_output_dir(base: &Path, run_name: &str) -> Result<PathBuf> {
    let preferred = base.join(run_name);
    if is_empty_dir(&preferred)? {
        return Ok(preferred);
    }

    let save = base.join("save");
    let mut candidate = save.join(run_name);
    let mut suffix = 2u32;
    while candidate.exists() {
        candidate = save.join(format!("{run_name}-{suffix}"));
        suffix += 1;
    }

    fs::create_dir_all(&candidate).map_err(|e| {
        ReportError::Config(format!(
            "failed to create output directory {}: {}",
            candidate.display(),
            e
        ))
    })?;

    Ok(candidate)
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(path).map_err(ReportError::Io)?;
    Ok(entries.next().is_none())
}
