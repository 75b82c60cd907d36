#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use media_intake_core::{CatalogConfig, CatalogLookup, CatalogRow, Config, Error, MediaKind, Result};
use tempfile::TempDir;

/// In-memory catalog that records every lookup
///
/// Unknown barcodes come back as rows with an empty name, the way the real
/// catalog answers.
#[derive(Default)]
pub struct FakeCatalog {
    rows: HashMap<String, CatalogRow>,
    pub calls: RefCell<Vec<BTreeSet<String>>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a barcode resolving to `identity` and `article`
    pub fn with(mut self, barcode: &str, identity: &str, article: &str) -> Self {
        self.rows.insert(
            barcode.to_string(),
            CatalogRow {
                barcode: barcode.to_string(),
                display_name: Some(format!("Product {}", identity)),
                canonical_identity: Some(identity.to_string()),
                material: Some("silver".to_string()),
                diagnostic_reason: None,
                article: Some(article.to_string()),
            },
        );
        self
    }

    /// Register a barcode the catalog knows but has no identity for
    pub fn with_nameless_identity(mut self, barcode: &str) -> Self {
        self.rows.insert(
            barcode.to_string(),
            CatalogRow {
                barcode: barcode.to_string(),
                display_name: Some("Legacy product".to_string()),
                ..Default::default()
            },
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CatalogLookup for FakeCatalog {
    fn lookup(&self, barcodes: &BTreeSet<String>) -> Result<Vec<CatalogRow>> {
        self.calls.borrow_mut().push(barcodes.clone());
        Ok(barcodes
            .iter()
            .map(|barcode| {
                self.rows.get(barcode).cloned().unwrap_or_else(|| CatalogRow {
                    barcode: barcode.clone(),
                    ..Default::default()
                })
            })
            .collect())
    }
}

/// Catalog that is always down
pub struct DownCatalog;

impl CatalogLookup for DownCatalog {
    fn lookup(&self, _barcodes: &BTreeSet<String>) -> Result<Vec<CatalogRow>> {
        Err(Error::CatalogUnavailable("connection refused".to_string()))
    }
}

/// A media root with every layout folder created
pub struct TestMedia {
    pub root: TempDir,
    pub config: Config,
}

impl TestMedia {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let config = Config {
            media_root: root.path().to_path_buf(),
            report_dir: root.path().join("REPORTS"),
            catalog: CatalogConfig {
                url: "http://127.0.0.1:9/renaming".to_string(),
                login: "bot".to_string(),
                password: "secret".to_string(),
                timeout_secs: Some(1),
            },
            ..Default::default()
        };

        for kind in [MediaKind::Photo, MediaKind::Video] {
            fs::create_dir_all(config.staging_dir(kind)).unwrap();
            fs::create_dir_all(config.sources_dir(kind)).unwrap();
            fs::create_dir_all(config.renamed_dir(kind)).unwrap();
        }

        Self { root, config }
    }
}

/// Write a small file whose content identifies it
pub fn write_file(dir: &Path, name: &str) {
    fs::write(dir.join(name), format!("content of {}", name)).unwrap();
}

/// Sorted (name, content) pairs of a folder
pub fn snapshot(dir: &Path) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            let content = fs::read_to_string(entry.path()).unwrap_or_default();
            (entry.file_name().to_string_lossy().into_owned(), content)
        })
        .collect();
    entries.sort();
    entries
}

/// Sorted names of a folder
pub fn names(dir: &Path) -> Vec<String> {
    snapshot(dir).into_iter().map(|(name, _)| name).collect()
}
