use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::naming::is_safe_identity;
use crate::types::MediaRecord;

/// Every structural problem found in a batch
///
/// `malformed` and `unresolved` never share a file: a name that does not parse
/// has no barcode to resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Names that match neither pattern
    pub malformed: Vec<String>,

    /// Well-formed names whose barcode the catalog does not know
    pub unresolved: Vec<String>,

    /// Resolved names whose canonical identity cannot be a file name
    #[serde(default)]
    pub unsafe_identities: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty() && self.unresolved.is_empty() && self.unsafe_identities.is_empty()
    }

    /// Newline-separated malformed names
    pub fn malformed_text(&self) -> String {
        self.malformed.join("\n")
    }

    /// Newline-separated unresolved names
    pub fn unresolved_text(&self) -> String {
        self.unresolved.join("\n")
    }

    /// Newline-separated names with an unusable canonical identity
    pub fn unsafe_identities_text(&self) -> String {
        self.unsafe_identities.join("\n")
    }

    /// Turn a dirty report into `Error::ValidationFailed`
    pub fn into_result(self) -> Result<()> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(Error::ValidationFailed(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "There are media naming issues")?;
        if !self.malformed.is_empty() {
            write!(f, "\n\nWrong file names:\n{}", self.malformed_text())?;
        }
        if !self.unresolved.is_empty() {
            write!(f, "\n\nNon existent barcodes:\n{}", self.unresolved_text())?;
        }
        if !self.unsafe_identities.is_empty() {
            write!(f, "\n\nUnusable canonical identities:\n{}", self.unsafe_identities_text())?;
        }
        Ok(())
    }
}

/// Classify enriched records
pub fn validate(records: &[MediaRecord]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for record in records {
        if !record.is_well_formed() {
            report.malformed.push(record.file_name.clone());
        } else if !record.is_resolved() {
            report.unresolved.push(record.file_name.clone());
        } else if let Some(identity) = &record.canonical_identity {
            if !is_safe_identity(identity) {
                report.unsafe_identities.push(record.file_name.clone());
            }
        }
    }

    if !report.is_clean() {
        log::warn!(
            "Validation found {} malformed names, {} unresolved barcodes and {} unusable identities",
            report.malformed.len(),
            report.unresolved.len(),
            report.unsafe_identities.len()
        );
    }

    report
}

/// The all-or-nothing gate in front of every file operation
pub fn ensure_valid(records: &[MediaRecord]) -> Result<()> {
    validate(records).into_result()
}
