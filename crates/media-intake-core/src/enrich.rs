use log::{debug, info};
use std::collections::{BTreeSet, HashMap};

use crate::catalog::{CatalogLookup, CatalogRow};
use crate::error::Result;
use crate::types::MediaRecord;

/// Distinct barcodes of every well-formed record
pub fn unique_barcodes<'a, I>(records: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a MediaRecord>,
{
    records
        .into_iter()
        .filter_map(|record| record.barcode.clone())
        .collect()
}

/// Resolve every record's barcode with a single catalog call
///
/// Records without a barcode pass through untouched. A failing lookup aborts
/// the whole batch; nothing is partially enriched.
pub fn enrich<C: CatalogLookup + ?Sized>(
    records: Vec<MediaRecord>,
    catalog: &C,
) -> Result<Vec<MediaRecord>> {
    let barcodes = unique_barcodes(&records);
    if barcodes.is_empty() {
        info!("No parseable barcodes among {} files, skipping catalog", records.len());
        return Ok(records);
    }

    let rows = catalog.lookup(&barcodes)?;
    Ok(apply_rows(records, &rows))
}

/// Join catalog rows onto records by barcode
pub fn apply_rows(mut records: Vec<MediaRecord>, rows: &[CatalogRow]) -> Vec<MediaRecord> {
    let by_barcode: HashMap<&str, &CatalogRow> =
        rows.iter().map(|row| (row.barcode.as_str(), row)).collect();

    for record in records.iter_mut() {
        let Some(barcode) = record.barcode.as_deref() else {
            continue;
        };

        match by_barcode.get(barcode) {
            Some(row) => {
                record.display_name = row.display_name.clone();
                record.canonical_identity = row.canonical_identity.clone();
                record.material = row.material.clone();
                record.diagnostic_reason = row.diagnostic_reason.clone();
                record.article = row.article.clone();
            }
            None => debug!("Catalog has no row for barcode {} ({})", barcode, record.file_name),
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::MediaKind;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::time::SystemTime;

    struct RecordingCatalog {
        rows: Vec<CatalogRow>,
        calls: RefCell<Vec<BTreeSet<String>>>,
    }

    impl CatalogLookup for RecordingCatalog {
        fn lookup(&self, barcodes: &BTreeSet<String>) -> Result<Vec<CatalogRow>> {
            self.calls.borrow_mut().push(barcodes.clone());
            Ok(self.rows.clone())
        }
    }

    struct DownCatalog;

    impl CatalogLookup for DownCatalog {
        fn lookup(&self, _barcodes: &BTreeSet<String>) -> Result<Vec<CatalogRow>> {
            Err(Error::CatalogUnavailable("connection refused".to_string()))
        }
    }

    fn record(name: &str, index: usize) -> MediaRecord {
        MediaRecord::new(PathBuf::from(name), MediaKind::Photo, SystemTime::UNIX_EPOCH, index)
    }

    fn row(barcode: &str, name: &str, aim: &str, article: &str) -> CatalogRow {
        CatalogRow {
            barcode: barcode.to_string(),
            display_name: Some(name.to_string()).filter(|s| !s.is_empty()),
            canonical_identity: Some(aim.to_string()),
            article: Some(article.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_enrich_calls_catalog_once_per_batch() {
        let catalog = RecordingCatalog {
            rows: vec![row("111", "Ring", "AIM-7", "R-1"), row("222", "Ring", "AIM-7", "R-1")],
            calls: RefCell::new(Vec::new()),
        };
        let records = vec![
            record("111_1.jpeg", 0),
            record("111_2.jpeg", 1),
            record("222_1.jpeg", 2),
            record("notes.txt", 3),
        ];

        let enriched = enrich(records, &catalog).unwrap();

        let calls = catalog.calls.borrow();
        assert_eq!(calls.len(), 1);
        let expected: BTreeSet<String> = ["111", "222"].iter().map(|s| s.to_string()).collect();
        assert_eq!(calls[0], expected);

        assert_eq!(enriched[0].canonical_identity.as_deref(), Some("AIM-7"));
        assert_eq!(enriched[2].article.as_deref(), Some("R-1"));
        assert!(enriched[3].display_name.is_none());
    }

    #[test]
    fn test_enrich_unknown_barcode_stays_unresolved() {
        let catalog = RecordingCatalog {
            // One row with an empty name, one barcode missing entirely
            rows: vec![row("999", "", "", "")],
            calls: RefCell::new(Vec::new()),
        };
        let records = vec![record("999_1.jpeg", 0), record("555_1.jpeg", 1)];

        let enriched = enrich(records, &catalog).unwrap();
        assert!(!enriched[0].is_resolved());
        assert!(!enriched[1].is_resolved());
    }

    #[test]
    fn test_enrich_without_barcodes_skips_catalog() {
        let catalog = RecordingCatalog {
            rows: Vec::new(),
            calls: RefCell::new(Vec::new()),
        };
        let enriched = enrich(vec![record("IMG_0001.jpeg", 0)], &catalog).unwrap();

        assert!(catalog.calls.borrow().is_empty());
        assert_eq!(enriched.len(), 1);
    }

    #[test]
    fn test_enrich_propagates_unavailable_catalog() {
        let result = enrich(vec![record("111_1.jpeg", 0)], &DownCatalog);
        assert!(matches!(result, Err(Error::CatalogUnavailable(_))));
    }
}
