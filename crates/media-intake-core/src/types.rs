use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// Supported media kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Name of the per-kind folder under every layout root
    pub fn folder_name(&self) -> &'static str {
        match self {
            Self::Photo => "PHOTO",
            Self::Video => "VIDEO",
        }
    }

    /// Extension used by both source and canonical file names
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Photo => "jpeg",
            Self::Video => "mp4",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Shot position encoded in the file name
///
/// Photos are shot from three positions, a video only ever occupies one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Angle {
    Shot(u8),
    Video,
}

impl Angle {
    /// Every slot a group of the given kind can fill
    pub fn slots(kind: MediaKind) -> &'static [Angle] {
        match kind {
            MediaKind::Photo => &[Angle::Shot(1), Angle::Shot(2), Angle::Shot(3)],
            MediaKind::Video => &[Angle::Video],
        }
    }

    /// The part of the file name after the underscore
    pub fn suffix(&self) -> String {
        match self {
            Self::Shot(n) => n.to_string(),
            Self::Video => "v1".to_string(),
        }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suffix())
    }
}

/// One physical file observed in a source folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// File name as stored on disk
    pub file_name: String,

    /// Full path to the file
    pub path: PathBuf,

    /// Kind of the folder the file was listed from
    pub kind: MediaKind,

    /// Barcode, present only when the name matched the kind's pattern
    pub barcode: Option<String>,

    /// Angle, present exactly when `barcode` is
    pub angle: Option<Angle>,

    /// Creation time at observation, used to pick the freshest shot
    pub created_at: SystemTime,

    /// Listing position, breaks ties between equal creation times
    pub listing_index: usize,

    // Populated by enrichment
    pub canonical_identity: Option<String>,
    pub display_name: Option<String>,
    pub material: Option<String>,
    pub diagnostic_reason: Option<String>,
    pub article: Option<String>,
}

impl MediaRecord {
    /// Build a record from a listed file, parsing its name against `kind`
    pub fn new(path: PathBuf, kind: MediaKind, created_at: SystemTime, listing_index: usize) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = crate::naming::parse(&file_name, kind);

        Self {
            file_name,
            path,
            kind,
            barcode: parsed.as_ref().map(|p| p.barcode.clone()),
            angle: parsed.map(|p| p.angle),
            created_at,
            listing_index,
            canonical_identity: None,
            display_name: None,
            material: None,
            diagnostic_reason: None,
            article: None,
        }
    }

    /// Whether the name matched the pattern of its kind
    pub fn is_well_formed(&self) -> bool {
        self.barcode.is_some()
    }

    /// Whether the catalog recognized the barcode
    pub fn is_resolved(&self) -> bool {
        self.display_name.is_some()
    }
}

impl fmt::Display for MediaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.article {
            Some(article) => write!(f, "[{}, {}]", self.file_name, article),
            None => write!(f, "[{}]", self.file_name),
        }
    }
}
