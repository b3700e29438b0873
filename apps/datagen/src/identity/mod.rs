//! Artifact identity — the `(sequence_index, template_id)` pair that ties one
//! record to every file derived from it.
//!
//! The string form lives here and nowhere else. Every stage that needs to know
//! which template a file was rendered with goes through [`parse`]. The render
//! stage names documents with [`ArtifactIdentity::file_name`]; every later stage
//! derives its output from its input with [`sibling_path`].
//!
//! # Filename convention
//! ```text
//! resume_0042_t07.html   resume_0042_t07.pdf   resume_0042_t07.png   resume_0042_t07.txt
//! ```
//! The stem is identical across all four kinds, so finding a sibling artifact is
//! a pure string operation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod selector;

pub use selector::TemplateSelector;

static RE_FULL_STEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^resume_(\d+)_t(\d{2})(?:-\d+)?(?:\..*)?$").expect("valid artifact stem regex")
});
static RE_TEMPLATE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_t(\d{2})(?:\D|$)").expect("valid template tag regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("sequence index must be >= 1")]
    ZeroSequenceIndex,

    #[error("template id {0} is outside the pool 1..={1}")]
    TemplateOutOfRange(u32, u8),

    #[error("record {0} already has a template assigned")]
    AlreadyAssigned(u32),
}

// ────────────────────────────────────────────────────────────────────────────
// Template ids and the template pool
// ────────────────────────────────────────────────────────────────────────────

/// A template identifier. Always in `1..=99` so it fits the two-digit `tNN` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TemplateId(u8);

impl TemplateId {
    /// The pool's first member; the fallback for names without a template tag.
    pub const FIRST: TemplateId = TemplateId(1);

    pub fn new(value: u32) -> Result<Self, IdentityError> {
        if (1..=99).contains(&value) {
            Ok(TemplateId(value as u8))
        } else {
            Err(IdentityError::TemplateOutOfRange(value, 99))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Directory name of this template under the templates root, e.g. `template_07`.
    pub fn dir_name(self) -> String {
        format!("template_{:02}", self.0)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl TryFrom<u8> for TemplateId {
    type Error = IdentityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TemplateId::new(value as u32)
    }
}

impl From<TemplateId> for u8 {
    fn from(id: TemplateId) -> Self {
        id.0
    }
}

/// The configured set of templates, `1..=size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplatePool {
    size: u8,
}

impl TemplatePool {
    pub fn new(size: u8) -> Result<Self, IdentityError> {
        if (1..=99).contains(&size) {
            Ok(TemplatePool { size })
        } else {
            Err(IdentityError::TemplateOutOfRange(size as u32, 99))
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn contains(&self, id: TemplateId) -> bool {
        id.0 <= self.size
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Artifact identity
// ────────────────────────────────────────────────────────────────────────────

/// Kinds of per-record artifact that carry the identity stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Document,
    Pdf,
    Image,
    Label,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Document => "html",
            ArtifactKind::Pdf => "pdf",
            ArtifactKind::Image => "png",
            ArtifactKind::Label => "txt",
        }
    }
}

/// Identity of one record across all of its artifacts. Created once at render
/// time and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactIdentity {
    sequence_index: u32,
    template_id: TemplateId,
}

impl ArtifactIdentity {
    pub fn new(sequence_index: u32, template_id: TemplateId) -> Result<Self, IdentityError> {
        if sequence_index == 0 {
            return Err(IdentityError::ZeroSequenceIndex);
        }
        Ok(ArtifactIdentity {
            sequence_index,
            template_id,
        })
    }

    pub fn sequence_index(&self) -> u32 {
        self.sequence_index
    }

    pub fn template_id(&self) -> TemplateId {
        self.template_id
    }

    /// The shared filename stem, e.g. `resume_0042_t07`.
    pub fn stem(&self) -> String {
        format(self.sequence_index, self.template_id)
    }

    pub fn file_name(&self, kind: ArtifactKind) -> String {
        format!("{}.{}", self.stem(), kind.extension())
    }
}

impl fmt::Display for ArtifactIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}

/// Encodes an identity as a filename stem.
pub fn format(sequence_index: u32, template_id: TemplateId) -> String {
    format!("resume_{:04}_t{}", sequence_index, template_id)
}

/// The artifact of `kind` in `dir` that shares `path`'s stem.
///
/// Names that carry no identity keep their stem too, so a stray file still maps
/// to a predictable sibling.
pub fn sibling_path(path: &Path, dir: &Path, kind: ArtifactKind) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    dir.join(format!("{stem}.{}", kind.extension()))
}

/// Result of decoding a filename. Either part may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedName {
    pub sequence_index: Option<u32>,
    pub template_id: Option<TemplateId>,
}

impl ParsedName {
    /// The full identity, when both parts were recovered.
    pub fn identity(&self) -> Option<ArtifactIdentity> {
        match (self.sequence_index, self.template_id) {
            (Some(seq), Some(tid)) => ArtifactIdentity::new(seq, tid).ok(),
            _ => None,
        }
    }

    /// True when no template tag could be found at all.
    pub fn is_unparseable(&self) -> bool {
        self.template_id.is_none()
    }

    /// The decoded template id, or [`TemplateId::FIRST`] when the name carried none.
    ///
    /// Callers that take the fallback are labelling with a guessed template and
    /// must count it.
    pub fn template_or_fallback(&self) -> TemplateId {
        self.template_id.unwrap_or(TemplateId::FIRST)
    }
}

/// Decodes the identity from a file name or path. Never fails; see [`ParsedName`].
///
/// A name matching the full `resume_<seq>_t<NN>` pattern yields both parts. A name
/// that only carries a `_tNN` tag somewhere yields the template alone.
pub fn parse(filename: impl AsRef<Path>) -> ParsedName {
    let path = filename.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy());

    if let Some(caps) = RE_FULL_STEM.captures(&name) {
        let sequence_index = caps[1].parse::<u32>().ok().filter(|&seq| seq > 0);
        let template_id = caps[2]
            .parse::<u32>()
            .ok()
            .and_then(|t| TemplateId::new(t).ok());
        return ParsedName {
            sequence_index,
            template_id,
        };
    }

    let template_id = RE_TEMPLATE_ONLY
        .captures(&name)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .and_then(|t| TemplateId::new(t).ok());

    ParsedName {
        sequence_index: None,
        template_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [ArtifactKind; 4] = [
        ArtifactKind::Document,
        ArtifactKind::Pdf,
        ArtifactKind::Image,
        ArtifactKind::Label,
    ];

    fn tid(n: u32) -> TemplateId {
        TemplateId::new(n).unwrap()
    }

    #[test]
    fn test_format_pads_both_fields() {
        assert_eq!(format(42, tid(7)), "resume_0042_t07");
        assert_eq!(format(1, tid(10)), "resume_0001_t10");
    }

    #[test]
    fn test_round_trip_across_indexes_templates_and_kinds() {
        let pool = TemplatePool::new(10).unwrap();
        let indexes = (1..=12).chain(998..=1001).chain(9998..=10001).chain([123_456, u32::MAX]);
        for seq in indexes {
            for t in 1..=u32::from(pool.size()) {
                let identity = ArtifactIdentity::new(seq, tid(t)).unwrap();
                for kind in KINDS {
                    let name = identity.file_name(kind);
                    let parsed = parse(&name);
                    assert_eq!(parsed.identity(), Some(identity), "{name}");
                    assert!(pool.contains(parsed.template_or_fallback()), "{name}");
                }
            }
        }
    }

    #[test]
    fn test_round_trip_past_four_digits() {
        let identity = ArtifactIdentity::new(123_456, tid(99)).unwrap();
        assert_eq!(identity.stem(), "resume_123456_t99");
        assert_eq!(parse(identity.file_name(ArtifactKind::Image)).identity(), Some(identity));
    }

    #[test]
    fn test_sibling_path_matches_identity_file_name() {
        let identity = ArtifactIdentity::new(42, tid(7)).unwrap();
        let image = Path::new("out/images/clean").join(identity.file_name(ArtifactKind::Image));
        for kind in KINDS {
            assert_eq!(
                sibling_path(&image, Path::new("out/x"), kind),
                Path::new("out/x").join(identity.file_name(kind))
            );
        }
        assert_eq!(
            sibling_path(&image, Path::new("labels"), ArtifactKind::Label),
            PathBuf::from("labels/resume_0042_t07.txt")
        );
        assert_eq!(
            sibling_path(Path::new("drop/scan.png"), Path::new("clean"), ArtifactKind::Image),
            PathBuf::from("clean/scan.png")
        );
    }

    #[test]
    fn test_parse_accepts_paths_and_page_suffix() {
        let parsed = parse("output/images/clean/resume_0042_t07-1.png");
        assert_eq!(parsed.sequence_index, Some(42));
        assert_eq!(parsed.template_id, Some(tid(7)));

        let tmp = parse("resume_0003_t02.tmp.html");
        assert_eq!(tmp.identity(), Some(ArtifactIdentity::new(3, tid(2)).unwrap()));
    }

    #[test]
    fn test_parse_template_tag_only() {
        let parsed = parse("scan_t05.png");
        assert_eq!(parsed.sequence_index, None);
        assert_eq!(parsed.template_id, Some(tid(5)));
        assert!(!parsed.is_unparseable());
        assert_eq!(parsed.identity(), None);
    }

    #[test]
    fn test_parse_unrelated_name_falls_back() {
        let parsed = parse("holiday_photo.png");
        assert!(parsed.is_unparseable());
        assert_eq!(parsed.template_or_fallback(), TemplateId::FIRST);
        assert_eq!(parsed.identity(), None);
    }

    #[test]
    fn test_parse_rejects_zero_components() {
        let parsed = parse("resume_0000_t00.png");
        assert_eq!(parsed.sequence_index, None);
        assert!(parsed.is_unparseable());
    }

    #[test]
    fn test_identity_rejects_zero_sequence() {
        assert_eq!(
            ArtifactIdentity::new(0, TemplateId::FIRST),
            Err(IdentityError::ZeroSequenceIndex)
        );
    }

    #[test]
    fn test_template_id_bounds() {
        assert!(TemplateId::new(0).is_err());
        assert!(TemplateId::new(100).is_err());
        assert_eq!(tid(3).dir_name(), "template_03");
        assert_eq!(tid(3).to_string(), "03");
    }

    #[test]
    fn test_pool_membership() {
        let pool = TemplatePool::new(10).unwrap();
        assert!(pool.contains(tid(10)));
        assert!(!pool.contains(tid(11)));
        assert!(TemplatePool::new(0).is_err());
    }
}
