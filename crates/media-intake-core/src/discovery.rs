use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::logging::log_file_error;
use crate::naming::is_ignored;
use crate::types::{MediaKind, MediaRecord};

/// List the media files directly inside `directory`
///
/// Entries are returned in file-name order; that order is the listing order
/// used to break creation-time ties. OS artifacts are skipped silently,
/// everything else becomes a record, including names that do not parse.
/// A file whose creation time cannot be read fails the whole listing.
pub fn discover_media(directory: &Path, kind: MediaKind) -> Result<Vec<MediaRecord>> {
    let mut records = Vec::new();

    for entry in entries(directory)? {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let file_name = entry.file_name().to_string_lossy();
        if is_ignored(&file_name) {
            continue;
        }

        let path = entry.path();
        let created_at = creation_time(path).map_err(|e| {
            log_file_error(path, "creation_time", &e);
            Error::Io(e)
        })?;

        let record = MediaRecord::new(path.to_path_buf(), kind, created_at, records.len());
        log::debug!(
            "Discovered {} (barcode: {:?}, angle: {:?})",
            record.file_name,
            record.barcode,
            record.angle
        );
        records.push(record);
    }

    Ok(records)
}

/// Count every entry directly inside `directory`, artifacts included
pub fn count_entries(directory: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in entries(directory)? {
        entry.map_err(|e| Error::Io(e.into()))?;
        count += 1;
    }
    Ok(count)
}

/// Names of every entry directly inside `directory`
pub fn entry_names(directory: &Path) -> Result<Vec<String>> {
    entries(directory)?
        .map(|entry| {
            entry
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .map_err(|e| Error::Io(e.into()))
        })
        .collect()
}

fn entries(directory: &Path) -> Result<walkdir::IntoIter> {
    if !directory.is_dir() {
        return Err(Error::DirectoryNotFound(directory.to_path_buf()));
    }

    Ok(WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter())
}

/// Birth time where the platform records it, modification time otherwise
fn creation_time(path: &Path) -> io::Result<SystemTime> {
    let metadata = fs::metadata(path)?;
    metadata.created().or_else(|_| metadata.modified())
}

// -- Tests --
