//! Detection of articles filed under more than one barcode.
//!
//! A collision is advisory: it never blocks a pipeline, it is reported so the
//! catalog can be fixed upstream.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::MediaRecord;

/// Which population a colliding file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Already in the accepted source folder
    Accepted,
    /// About to be accepted
    Pending,
}

/// One file involved in a collision
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CollisionFile {
    pub file_name: String,
    pub barcode: String,
    pub origin: Origin,
}

/// Every file of one article reachable from several barcodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollisionSet {
    pub article: String,
    pub barcodes: BTreeSet<String>,
    /// Sorted by file name
    pub files: Vec<CollisionFile>,
    /// True when pending files bring a barcode the accepted set does not have
    pub introduced_by_pending: bool,
}

/// Collisions across the accepted and pending populations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollisionReport {
    pub collisions: Vec<CollisionSet>,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.collisions.is_empty()
    }

    /// Collisions that the pending files caused
    pub fn introduced(&self) -> impl Iterator<Item = &CollisionSet> {
        self.collisions.iter().filter(|set| set.introduced_by_pending)
    }

    /// Collisions that were already present among accepted files
    pub fn pre_existing(&self) -> impl Iterator<Item = &CollisionSet> {
        self.collisions.iter().filter(|set| !set.introduced_by_pending)
    }

    /// Plain article → sorted file names view
    pub fn to_article_map(&self) -> BTreeMap<String, Vec<String>> {
        self.collisions
            .iter()
            .map(|set| {
                let names = set.files.iter().map(|f| f.file_name.clone()).collect();
                (set.article.clone(), names)
            })
            .collect()
    }

    /// Write the full report, origin of every file included, as JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Write the plain article → file names view as JSON
    pub fn save_article_map(&self, path: &Path) -> Result<()> {
        write_json(path, &self.to_article_map())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value).map_err(|e| Error::Io(e.into()))?;
    Ok(())
}

/// Articles reachable from more than one barcode, with their sorted file names
pub fn detect(records: &[MediaRecord]) -> BTreeMap<String, Vec<String>> {
    detect_across(records, &[]).to_article_map()
}

/// Run detection over the union of accepted and pending records
pub fn detect_across(accepted: &[MediaRecord], pending: &[MediaRecord]) -> CollisionReport {
    let mut by_article: BTreeMap<&str, Vec<CollisionFile>> = BTreeMap::new();

    let tagged = accepted
        .iter()
        .map(|record| (record, Origin::Accepted))
        .chain(pending.iter().map(|record| (record, Origin::Pending)));

    for (record, origin) in tagged {
        let (Some(article), Some(barcode)) = (record.article.as_deref(), &record.barcode) else {
            continue;
        };
        by_article.entry(article).or_default().push(CollisionFile {
            file_name: record.file_name.clone(),
            barcode: barcode.clone(),
            origin,
        });
    }

    let mut report = CollisionReport::default();

    for (article, mut files) in by_article {
        let barcodes: BTreeSet<String> = files.iter().map(|f| f.barcode.clone()).collect();
        if barcodes.len() < 2 {
            continue;
        }

        let accepted_barcodes: BTreeSet<&str> = files
            .iter()
            .filter(|f| f.origin == Origin::Accepted)
            .map(|f| f.barcode.as_str())
            .collect();
        let introduced_by_pending = files
            .iter()
            .any(|f| f.origin == Origin::Pending && !accepted_barcodes.contains(f.barcode.as_str()));

        files.sort();
        log::warn!(
            "Article {} is filed under {} barcodes: {:?}",
            article,
            barcodes.len(),
            barcodes
        );

        report.collisions.push(CollisionSet {
            article: article.to_string(),
            barcodes,
            files,
            introduced_by_pending,
        });
    }

    report
}
