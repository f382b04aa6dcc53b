//! Extraction of `.sb3` project archives.
//!
//! A `.sb3` file is a plain zip holding `project.json` plus the asset files
//! it references.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use zip::ZipArchive;

/// Extract every entry of `archive` into `dest`.
///
/// Entries whose names would escape `dest` are skipped.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("invalid archive {}", archive.display()))?;

    fs::create_dir_all(dest)?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}
