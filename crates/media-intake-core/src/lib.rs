//! Core functionality for taking product media into the catalog folders.
//!
//! This library provides the components of the intake pipelines:
//! - File name parsing and folder discovery
//! - Barcode resolution against the product catalog
//! - All-or-nothing validation of a batch
//! - Per-identity, per-angle selection of the freshest shot
//! - Detection of articles filed under several barcodes
//! - Destination replacement and acceptance of new files

// -- External Dependencies --

use log::{info, warn};
use serde::Serialize;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use catalog::{CatalogLookup, CatalogRow, HttpCatalogClient};
pub use collision::{CollisionReport, CollisionSet, Origin};
pub use config::*;
pub use error::{Error, Result};
pub use grouping::CanonicalGroup;
pub use sync::SyncReport;
pub use types::*;
pub use validation::ValidationReport;

// -- Public Modules --
pub mod catalog;
pub mod collision;
pub mod config;
pub mod discovery;
pub mod enrich;
pub mod grouping;
pub mod logging;
pub mod naming;
pub mod sync;
pub mod types;
pub mod validation;

/// A canonical group that does not cover every angle of its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteGroup {
    pub identity: String,
    pub missing: Vec<Angle>,
}

/// Result of a rename run
#[derive(Debug, Clone, Serialize)]
pub struct RenameReport {
    pub sync: SyncReport,
    /// Informational: groups with missing angles
    pub incomplete_groups: Vec<IncompleteGroup>,
    /// Informational: resolved files without a canonical identity, not staged
    pub without_identity: Vec<String>,
}

/// Result of an accept run
#[derive(Debug, Clone, Serialize)]
pub struct AcceptReport {
    /// Names moved into the accepted folder
    pub moved: Vec<String>,
    /// Advisory collisions over accepted and freshly accepted files
    pub collisions: CollisionReport,
}

/// Result of a read-only check
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub checked: usize,
    pub without_identity: Vec<String>,
}

/// Main entry point for the intake pipelines
pub struct MediaIntake<C: CatalogLookup> {
    config: Config,
    catalog: C,
}

impl MediaIntake<HttpCatalogClient> {
    /// Validate the configuration and connect to the HTTP catalog
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let catalog = HttpCatalogClient::new(&config.catalog)?;
        Ok(Self::new(config, catalog))
    }
}

impl<C: CatalogLookup> MediaIntake<C> {
    /// Create a new MediaIntake with the provided configuration and catalog
    pub fn new(config: Config, catalog: C) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Copy the freshest shot per identity and angle into the renamed folder
    ///
    /// Nothing in the destination is touched unless every source file is
    /// well named and known to the catalog.
    pub fn rename(&self, kind: MediaKind) -> Result<RenameReport> {
        let source = self.config.sources_dir(kind);
        let destination = self.config.renamed_dir(kind);
        if !destination.is_dir() {
            return Err(Error::DirectoryNotFound(destination));
        }

        info!("Renaming {} files from {}", kind, source.display());
        let records = self.load_non_empty(&source, kind)?;
        validation::ensure_valid(&records)?;

        let without_identity = names(grouping::without_identity(&records));
        if !without_identity.is_empty() {
            warn!("{} files resolve to no identity and are skipped", without_identity.len());
        }

        let groups = grouping::group(&records);
        let incomplete_groups: Vec<IncompleteGroup> = groups
            .iter()
            .filter_map(|group| {
                let missing = group.missing_angles();
                (!missing.is_empty()).then(|| IncompleteGroup {
                    identity: group.identity.clone(),
                    missing,
                })
            })
            .collect();
        for group in &incomplete_groups {
            info!("{} has no shot for angles {:?}", group.identity, group.missing);
        }

        let sync = sync::synchronize(&groups, &destination)?;
        info!("{}", sync);

        Ok(RenameReport {
            sync,
            incomplete_groups,
            without_identity,
        })
    }

    /// Move freshly captured files from staging into the accepted folder
    pub fn accept(&self, kind: MediaKind) -> Result<AcceptReport> {
        let staging = self.config.staging_dir(kind);
        let destination = self.config.sources_dir(kind);

        let pending = discovery::discover_media(&staging, kind)?;
        if pending.is_empty() {
            return Err(Error::SourceEmpty(staging));
        }
        sync::ensure_no_name_collisions(&pending, &destination)?;

        let accepted = discovery::discover_media(&destination, kind)?;
        info!(
            "Accepting {} {} files next to {} accepted ones",
            pending.len(),
            kind,
            accepted.len()
        );

        // One lookup for both populations
        let split = pending.len();
        let mut all = pending;
        all.extend(accepted);
        let mut pending = enrich::enrich(all, &self.catalog)?;
        let accepted = pending.split_off(split);

        validation::ensure_valid(&pending)?;

        let collisions = collision::detect_across(&accepted, &pending);
        if collisions.introduced().next().is_some() {
            warn!("Accepted files introduce new duplicate articles");
        }

        let moved = sync::move_files(&pending, &destination)?;
        info!("Accepted {} files into {}", moved.len(), destination.display());

        Ok(AcceptReport { moved, collisions })
    }

    /// Validate the accepted folder without changing anything
    pub fn check(&self, kind: MediaKind) -> Result<CheckReport> {
        let source = self.config.sources_dir(kind);
        let records = self.load_non_empty(&source, kind)?;
        validation::ensure_valid(&records)?;

        info!("Checked {} {} files", records.len(), kind);
        Ok(CheckReport {
            checked: records.len(),
            without_identity: names(grouping::without_identity(&records)),
        })
    }

    /// Articles filed under more than one barcode in the accepted folder
    pub fn duplicates(&self, kind: MediaKind) -> Result<CollisionReport> {
        let source = self.config.sources_dir(kind);
        let records = self.load_non_empty(&source, kind)?;
        validation::ensure_valid(&records)?;

        let report = collision::detect_across(&records, &[]);
        info!("{} articles are filed under several barcodes", report.collisions.len());
        Ok(report)
    }

    fn load_non_empty(&self, directory: &std::path::Path, kind: MediaKind) -> Result<Vec<MediaRecord>> {
        let records = discovery::discover_media(directory, kind)?;
        if records.is_empty() {
            return Err(Error::SourceEmpty(directory.to_path_buf()));
        }
        enrich::enrich(records, &self.catalog)
    }
}

fn names(records: Vec<&MediaRecord>) -> Vec<String> {
    records.into_iter().map(|r| r.file_name.clone()).collect()
}
