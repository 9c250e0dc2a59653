//! Finds recordings on the mounted recorder.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use dictaphone_core::{Recipient, SourceConfig, WorkItem};

/// Lists recordings in configured folder order, files sorted by name.
///
/// The extension is matched case-sensitively, so renamed `.BAK` files and
/// lowercase duplicates are ignored. A missing folder is skipped.
pub fn discover(source: &SourceConfig) -> Result<Vec<WorkItem>> {
    let mut items = Vec::new();

    for folder in &source.folders {
        let dir = source.root.join(&folder.path);
        if !dir.is_dir() {
            warn!("Recorder folder {:?} not found, skipping", dir);
            continue;
        }

        let found = scan_folder(&dir, &source.extension, &folder.recipients)
            .with_context(|| format!("Failed to scan {:?}", dir))?;
        debug!("Found {} recording(s) in {:?}", found.len(), dir);
        items.extend(found);
    }

    Ok(items)
}

fn scan_folder(dir: &Path, extension: &str, recipients: &[Recipient]) -> Result<Vec<WorkItem>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path.is_file()
            && path
                .extension()
                .map(|ext| ext == extension)
                .unwrap_or(false);
        if matches {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .map(|path| WorkItem::new(path, recipients.to_vec()))
        .collect())
}
