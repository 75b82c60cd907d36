use std::collections::BTreeMap;

use crate::naming::canonical_name;
use crate::types::{Angle, MediaKind, MediaRecord};

/// The freshest shot per angle of one product identity
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalGroup {
    pub identity: String,
    pub kind: MediaKind,
    pub selected: BTreeMap<Angle, MediaRecord>,
}

impl CanonicalGroup {
    /// Angle slots of this kind that no file fills
    pub fn missing_angles(&self) -> Vec<Angle> {
        Angle::slots(self.kind)
            .iter()
            .filter(|angle| !self.selected.contains_key(*angle))
            .copied()
            .collect()
    }

    /// Canonical destination name paired with the record that provides it
    pub fn canonical_files(&self) -> impl Iterator<Item = (String, &MediaRecord)> + '_ {
        self.selected
            .iter()
            .map(|(angle, record)| (canonical_name(&self.identity, *angle, self.kind), record))
    }
}

/// Group validated records by identity and keep the most recent file per angle
///
/// Ties on creation time go to the record listed first. Records without an
/// identity or angle are left out; see [`without_identity`].
pub fn group(records: &[MediaRecord]) -> Vec<CanonicalGroup> {
    let mut groups: BTreeMap<(String, MediaKind), BTreeMap<Angle, &MediaRecord>> = BTreeMap::new();

    for record in records {
        let (Some(identity), Some(angle)) = (&record.canonical_identity, record.angle) else {
            continue;
        };

        let slots = groups.entry((identity.clone(), record.kind)).or_default();
        if let Some(current) = slots.get(&angle) {
            if !is_fresher(record, current) {
                log::debug!(
                    "{} loses {} angle {} to {}",
                    record.file_name,
                    identity,
                    angle,
                    current.file_name
                );
                continue;
            }
        }
        slots.insert(angle, record);
    }

    groups
        .into_iter()
        .map(|((identity, kind), slots)| CanonicalGroup {
            identity,
            kind,
            selected: slots
                .into_iter()
                .map(|(angle, record)| (angle, record.clone()))
                .collect(),
        })
        .collect()
}

/// Resolved records the catalog gave no identity; they cannot be staged
pub fn without_identity(records: &[MediaRecord]) -> Vec<&MediaRecord> {
    records
        .iter()
        .filter(|record| record.is_resolved() && record.canonical_identity.is_none())
        .collect()
}

fn is_fresher(candidate: &MediaRecord, current: &MediaRecord) -> bool {
    candidate.created_at > current.created_at
        || (candidate.created_at == current.created_at
            && candidate.listing_index < current.listing_index)
}
