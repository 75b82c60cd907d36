//! Destructive file operations on the destination folders.
//!
//! Callers must have passed validation before reaching anything here.

use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::discovery::{count_entries, entry_names};
use crate::error::{Error, Result};
use crate::grouping::CanonicalGroup;
use crate::logging::{log_file_error, log_fs_modification};
use crate::naming::is_safe_identity;
use crate::types::MediaRecord;
use crate::validation::ValidationReport;

/// Outcome of a full destination replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries in the destination before it was emptied
    pub before_count: usize,

    /// Entries after the canonical set was written
    pub after_count: usize,

    /// Files copied
    pub copied: usize,

    /// Wall-clock time of the copy phase
    pub duration: Duration,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The renaming operation was successfully completed. It took {} seconds. \
             Before the operation, the destination folder contained {} files, and it has {} files afterward.",
            self.duration.as_secs_f64().round(),
            self.before_count,
            self.after_count
        )
    }
}

/// Replace the contents of `destination` with the canonical files of `groups`
///
/// The destination is emptied completely before anything is copied; a crash
/// in between leaves it empty. Groups whose identity cannot be a file name are
/// refused before anything is removed. Source files are never modified.
pub fn synchronize(groups: &[CanonicalGroup], destination: &Path) -> Result<SyncReport> {
    let before_count = count_entries(destination)?;

    let unusable: Vec<String> = groups
        .iter()
        .filter(|group| !is_safe_identity(&group.identity))
        .flat_map(|group| group.selected.values().map(|r| r.file_name.clone()))
        .collect();
    if !unusable.is_empty() {
        return Err(Error::ValidationFailed(ValidationReport {
            unsafe_identities: unusable,
            ..Default::default()
        }));
    }

    info!(
        "Replacing {} entries in {} with {} canonical groups",
        before_count,
        destination.display(),
        groups.len()
    );

    empty_destination(destination)?;

    let start = Instant::now();
    let mut copied = 0;
    for group in groups {
        for (name, record) in group.canonical_files() {
            let dst = destination.join(&name);
            copy_file(&record.path, &dst)?;
            debug!("{} -> {}", record.file_name, name);
            copied += 1;
        }
    }
    let duration = start.elapsed();

    let after_count = count_entries(destination)?;
    log_fs_modification(
        "synchronize",
        destination,
        Some(&format!("{} files copied in {:?}", copied, duration)),
    );

    Ok(SyncReport {
        before_count,
        after_count,
        copied,
        duration,
    })
}

/// Delete every entry inside `destination`, keeping the folder itself
pub fn empty_destination(destination: &Path) -> Result<()> {
    for name in entry_names(destination)? {
        let path = destination.join(&name);
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };

        if let Err(e) = result {
            log_file_error(&path, "remove", &e);
            return Err(e.into());
        }
        log_fs_modification("remove", &path, None);
    }
    Ok(())
}

/// Fail with every name in `records` that already exists in `destination`
pub fn ensure_no_name_collisions(records: &[MediaRecord], destination: &Path) -> Result<()> {
    let existing: BTreeSet<String> = entry_names(destination)?.into_iter().collect();

    let mut taken: Vec<String> = records
        .iter()
        .filter(|record| existing.contains(&record.file_name))
        .map(|record| record.file_name.clone())
        .collect();

    if taken.is_empty() {
        Ok(())
    } else {
        taken.sort();
        Err(Error::DestinationNotEmpty(taken))
    }
}

/// Move every record into `destination` under its current name
pub fn move_files(records: &[MediaRecord], destination: &Path) -> Result<Vec<String>> {
    let mut moved = Vec::with_capacity(records.len());

    for record in records {
        let dst = destination.join(&record.file_name);
        if let Err(e) = fs::rename(&record.path, &dst) {
            // Different filesystems: fall back to copy + remove
            debug!("rename of {} failed ({}), copying", record.path.display(), e);
            copy_file(&record.path, &dst)?;
            if let Err(e) = fs::remove_file(&record.path) {
                log_file_error(&record.path, "remove", &e);
                return Err(e.into());
            }
        }
        log_fs_modification("move", &record.path, Some(&dst.display().to_string()));
        moved.push(record.file_name.clone());
    }

    Ok(moved)
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    match fs::copy(src, dst) {
        Ok(_) => Ok(()),
        Err(e) => {
            log_file_error(src, "copy", &e);
            Err(e.into())
        }
    }
}
