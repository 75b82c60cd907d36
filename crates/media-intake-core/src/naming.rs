//! File name parsing and canonical name construction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Angle, MediaKind};

static PHOTO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)_([123])\.jpeg$").expect("valid photo pattern"));

static VIDEO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)_v1\.mp4$").expect("valid video pattern"));

/// Directory-listing artifacts that are never treated as data
const IGNORED_NAMES: &[&str] = &[".DS_Store"];

/// Barcode and angle extracted from a well-formed name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub barcode: String,
    pub angle: Angle,
}

/// Parse `file_name` against the pattern of `kind`
///
/// Returns `None` when the name does not match; the caller keeps the file
/// so the validator can report it with the rest of the batch.
pub fn parse(file_name: &str, kind: MediaKind) -> Option<ParsedName> {
    match kind {
        MediaKind::Photo => {
            let caps = PHOTO_PATTERN.captures(file_name)?;
            let angle = caps[2].parse::<u8>().ok()?;
            Some(ParsedName {
                barcode: caps[1].to_string(),
                angle: Angle::Shot(angle),
            })
        }
        MediaKind::Video => {
            let caps = VIDEO_PATTERN.captures(file_name)?;
            Some(ParsedName {
                barcode: caps[1].to_string(),
                angle: Angle::Video,
            })
        }
    }
}

/// Name a selected file receives in the canonical destination
pub fn canonical_name(identity: &str, angle: Angle, kind: MediaKind) -> String {
    format!("{}_{}.{}", identity, angle.suffix(), kind.extension())
}

/// Whether a catalog identity can be used as a file name stem
///
/// Identities become names inside the destination folder, so separators and
/// parent references are rejected.
pub fn is_safe_identity(identity: &str) -> bool {
    !identity.trim().is_empty()
        && !identity.contains(&['/', '\\'][..])
        && !identity.contains("..")
}

/// Returns true for OS artifacts that must be skipped silently
pub fn is_ignored(file_name: &str) -> bool {
    IGNORED_NAMES.contains(&file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_safety() {
        assert!(is_safe_identity("AIM-7"));
        assert!(is_safe_identity("R.100"));
        assert!(!is_safe_identity(""));
        assert!(!is_safe_identity("  "));
        assert!(!is_safe_identity("AIM/2"));
        assert!(!is_safe_identity("AIM\\2"));
        assert!(!is_safe_identity("../outside"));
        assert!(!is_safe_identity(".."));
    }

    #[test]
    fn test_parse_photo_names() {
        let parsed = parse("4600123_2.jpeg", MediaKind::Photo).unwrap();
        assert_eq!(parsed.barcode, "4600123");
        assert_eq!(parsed.angle, Angle::Shot(2));

        for angle in 1..=3 {
            let name = format!("42_{}.jpeg", angle);
            assert_eq!(parse(&name, MediaKind::Photo).unwrap().angle, Angle::Shot(angle));
        }
    }

    #[test]
    fn test_parse_rejects_near_misses() {
        let bad = [
            "123_4.jpeg",
            "123_0.jpeg",
            "123_1.JPEG",
            "123_1.jpg",
            "123-1.jpeg",
            "_1.jpeg",
            "abc_1.jpeg",
            "123_1.jpeg.bak",
            " 123_1.jpeg",
            "123_12.jpeg",
            "",
        ];
        for name in bad {
            assert!(parse(name, MediaKind::Photo).is_none(), "{} should not parse", name);
        }
    }

    #[test]
    fn test_parse_video_names() {
        let parsed = parse("777_v1.mp4", MediaKind::Video).unwrap();
        assert_eq!(parsed.barcode, "777");
        assert_eq!(parsed.angle, Angle::Video);

        assert!(parse("777_v2.mp4", MediaKind::Video).is_none());
        assert!(parse("777_1.mp4", MediaKind::Video).is_none());
        assert!(parse("777_v1.MP4", MediaKind::Video).is_none());
    }

    #[test]
    fn test_kind_patterns_do_not_overlap() {
        assert!(parse("777_v1.mp4", MediaKind::Photo).is_none());
        assert!(parse("777_1.jpeg", MediaKind::Video).is_none());
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("AIM-7", Angle::Shot(1), MediaKind::Photo), "AIM-7_1.jpeg");
        assert_eq!(canonical_name("AIM-7", Angle::Video, MediaKind::Video), "AIM-7_v1.mp4");
    }

    #[test]
    fn test_is_ignored() {
        assert!(is_ignored(".DS_Store"));
        assert!(!is_ignored("123_1.jpeg"));
    }
}
