//! Layout Resolver — loads a template's `layout_config.json` and canonicalises it.
//!
//! # Accepted shapes
//! The file is either `{"sections": {<name>: <bounds>, ...}}` or the bare
//! `{<name>: <bounds>, ...}` mapping. Each `<bounds>` object may use
//! `y_start`/`y_end` or the legacy `y0`/`y1`. Missing x-bounds mean full width.
//!
//! # Key precedence
//! A modern key wins whenever it is present. The legacy key is read only when
//! its modern counterpart is absent, independently for the start and end bound.
//!
//! # Corrections
//! Out-of-range bounds are clamped to `[0, 1]` and inverted pairs swapped, each
//! with a warning. A section whose area is zero after correction is dropped.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::PipelineError;
use crate::identity::TemplateId;
use crate::layout::SectionClass;

pub const LAYOUT_FILE_NAME: &str = "layout_config.json";

/// A section rectangle in fractional image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionRect {
    pub class: SectionClass,
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,
}

/// A template's sections in file order, plus any corrections applied on the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLayout {
    pub template_id: TemplateId,
    pub sections: Vec<SectionRect>,
    pub corrections: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LayoutResolver {
    templates_dir: PathBuf,
}

impl LayoutResolver {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        LayoutResolver {
            templates_dir: templates_dir.into(),
        }
    }

    pub fn config_path(&self, template_id: TemplateId) -> PathBuf {
        self.templates_dir
            .join(template_id.dir_name())
            .join(LAYOUT_FILE_NAME)
    }

    /// Loads and canonicalises the layout for `template_id`.
    ///
    /// Fails with `MissingConfig` when the file does not exist; the caller skips
    /// the image.
    pub fn resolve(&self, template_id: TemplateId) -> Result<ResolvedLayout, PipelineError> {
        let path = self.config_path(template_id);
        let text = read_layout_file(&path, template_id)?;
        resolve_layout_str(template_id, &text)
    }
}

fn read_layout_file(path: &Path, template_id: TemplateId) -> Result<String, PipelineError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::MissingConfig {
            template_id,
            path: path.to_path_buf(),
        },
        _ => PipelineError::Io(e),
    })
}

pub fn resolve_layout_str(template_id: TemplateId, text: &str) -> Result<ResolvedLayout, PipelineError> {
    let value: Value = serde_json::from_str(text).map_err(|e| PipelineError::MalformedLayout {
        template_id,
        detail: format!("invalid JSON: {e}"),
    })?;
    resolve_layout_value(template_id, &value)
}

pub fn resolve_layout_value(
    template_id: TemplateId,
    value: &Value,
) -> Result<ResolvedLayout, PipelineError> {
    let malformed = |detail: String| PipelineError::MalformedLayout {
        template_id,
        detail,
    };

    let root = value
        .as_object()
        .ok_or_else(|| malformed("layout root is not an object".to_string()))?;
    let sections = match root.get("sections") {
        Some(Value::Object(inner)) => inner,
        Some(_) => return Err(malformed("'sections' is not an object".to_string())),
        None => root,
    };

    let mut resolved = ResolvedLayout {
        template_id,
        sections: Vec::with_capacity(sections.len()),
        corrections: Vec::new(),
    };

    for (name, bounds) in sections {
        let Some(class) = SectionClass::from_name(name) else {
            debug!(template_id = %template_id, section = %name, "Ignoring non-canonical layout section");
            continue;
        };
        let bounds = bounds
            .as_object()
            .ok_or_else(|| malformed(format!("bounds for '{name}' are not an object")))?;

        let x_start = read_bound(bounds, "x_start", None, 0.0).map_err(&malformed)?;
        let x_end = read_bound(bounds, "x_end", None, 1.0).map_err(&malformed)?;
        let y_start = read_bound(bounds, "y_start", Some("y0"), 0.0).map_err(&malformed)?;
        let y_end = read_bound(bounds, "y_end", Some("y1"), 1.0).map_err(&malformed)?;

        let (x_start, x_end) = correct_span(class, "x", x_start, x_end, &mut resolved.corrections);
        let (y_start, y_end) = correct_span(class, "y", y_start, y_end, &mut resolved.corrections);

        if x_start >= x_end || y_start >= y_end {
            let note = format!("{class}: zero-area rectangle dropped");
            warn!(template_id = %template_id, "{note}");
            resolved.corrections.push(note);
            continue;
        }

        resolved.sections.push(SectionRect {
            class,
            x_start,
            x_end,
            y_start,
            y_end,
        });
    }

    if !resolved.corrections.is_empty() {
        warn!(
            template_id = %template_id,
            corrections = resolved.corrections.len(),
            "Layout bounds corrected"
        );
    }

    Ok(resolved)
}

/// Reads one bound: the modern key if present, else the legacy key, else `default`.
fn read_bound(
    bounds: &Map<String, Value>,
    key: &str,
    legacy_key: Option<&str>,
    default: f64,
) -> Result<f64, String> {
    let raw = bounds
        .get(key)
        .map(|v| (key, v))
        .or_else(|| legacy_key.and_then(|lk| bounds.get(lk).map(|v| (lk, v))));

    match raw {
        None => Ok(default),
        Some((used, v)) => v
            .as_f64()
            .ok_or_else(|| format!("bound '{used}' is not a number: {v}")),
    }
}

/// Clamps a span into `[0, 1]` and orders it, logging every change.
fn correct_span(
    class: SectionClass,
    axis: &str,
    start: f64,
    end: f64,
    corrections: &mut Vec<String>,
) -> (f64, f64) {
    let (mut lo, mut hi) = (start.clamp(0.0, 1.0), end.clamp(0.0, 1.0));
    if lo != start || hi != end {
        corrections.push(format!(
            "{class}: {axis} span [{start}, {end}] clamped to [{lo}, {hi}]"
        ));
    }
    if lo > hi {
        std::mem::swap(&mut lo, &mut hi);
        corrections.push(format!("{class}: inverted {axis} span swapped"));
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tid(n: u32) -> TemplateId {
        TemplateId::new(n).unwrap()
    }

    fn resolve(value: Value) -> ResolvedLayout {
        resolve_layout_value(tid(1), &value).unwrap()
    }

    #[test]
    fn test_bare_mapping_with_default_x() {
        let layout = resolve(json!({"header": {"y_start": 0.0, "y_end": 0.15}}));
        assert_eq!(
            layout.sections,
            vec![SectionRect {
                class: SectionClass::Header,
                x_start: 0.0,
                x_end: 1.0,
                y_start: 0.0,
                y_end: 0.15,
            }]
        );
        assert!(layout.corrections.is_empty());
    }

    #[test]
    fn test_sections_envelope_accepted() {
        let layout = resolve(json!({"sections": {"skills": {"x_start": 0.0, "x_end": 0.3, "y_start": 0.2, "y_end": 0.6}}}));
        assert_eq!(layout.sections.len(), 1);
        assert_eq!(layout.sections[0].class, SectionClass::Skills);
        assert_eq!(layout.sections[0].x_end, 0.3);
    }

    #[test]
    fn test_legacy_keys_resolve_like_modern_keys() {
        let legacy = resolve(json!({"education": {"y0": 0.1, "y1": 0.4}}));
        let modern = resolve(json!({"education": {"y_start": 0.1, "y_end": 0.4}}));
        assert_eq!(legacy.sections, modern.sections);
    }

    #[test]
    fn test_modern_key_preferred_over_legacy() {
        let layout = resolve(json!({"projects": {"y_start": 0.3, "y0": 0.9, "y1": 0.5}}));
        let rect = layout.sections[0];
        assert_eq!(rect.y_start, 0.3);
        // y_end absent → legacy y1 used.
        assert_eq!(rect.y_end, 0.5);
    }

    #[test]
    fn test_unknown_sections_dropped_and_order_kept() {
        let layout = resolve(json!({
            "hobbies": {"y_start": 0.9, "y_end": 1.0},
            "footer": {"y_start": 0.95, "y_end": 1.0},
            "header": {"y_start": 0.0, "y_end": 0.1}
        }));
        let classes: Vec<SectionClass> = layout.sections.iter().map(|s| s.class).collect();
        assert_eq!(classes, vec![SectionClass::Hobbies, SectionClass::Header]);
    }

    #[test]
    fn test_out_of_range_bounds_clamped() {
        let layout = resolve(json!({"experience": {"x_start": -0.2, "x_end": 1.3, "y_start": 0.5, "y_end": 1.2}}));
        let rect = layout.sections[0];
        assert_eq!((rect.x_start, rect.x_end, rect.y_start, rect.y_end), (0.0, 1.0, 0.5, 1.0));
        assert_eq!(layout.corrections.len(), 2);
    }

    #[test]
    fn test_inverted_span_swapped() {
        let layout = resolve(json!({"skills": {"y_start": 0.6, "y_end": 0.2}}));
        let rect = layout.sections[0];
        assert_eq!((rect.y_start, rect.y_end), (0.2, 0.6));
        assert_eq!(layout.corrections.len(), 1);
    }

    #[test]
    fn test_zero_area_section_dropped() {
        let layout = resolve(json!({"skills": {"y_start": 0.4, "y_end": 0.4}, "header": {"y_end": 0.1}}));
        assert_eq!(layout.sections.len(), 1);
        assert_eq!(layout.sections[0].class, SectionClass::Header);
        assert_eq!(layout.corrections.len(), 1);
    }

    #[test]
    fn test_resolved_rectangles_satisfy_bounds() {
        let layout = resolve(json!({
            "header": {"y_start": 0.0, "y_end": 0.15},
            "education": {"x_start": 0.0, "x_end": 0.35, "y0": 0.15, "y1": 0.35},
            "skills": {"x_start": 0.0, "x_end": 0.35, "y_start": 0.35, "y_end": 0.7},
            "projects": {"x_start": 0.35, "x_end": 1.0, "y_start": 0.15, "y_end": 0.55},
            "experience": {"x_start": 0.35, "x_end": 1.0, "y_start": 0.55, "y_end": 0.85},
            "hobbies": {"y_start": 0.85, "y_end": 1.0}
        }));
        assert_eq!(layout.sections.len(), 6);
        for r in &layout.sections {
            assert!(0.0 <= r.x_start && r.x_start < r.x_end && r.x_end <= 1.0, "{r:?}");
            assert!(0.0 <= r.y_start && r.y_start < r.y_end && r.y_end <= 1.0, "{r:?}");
        }
    }

    #[test]
    fn test_non_numeric_bound_is_malformed() {
        let err = resolve_layout_value(tid(4), &json!({"header": {"y_end": "0.2"}})).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedLayout { .. }), "{err:?}");
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = resolve_layout_str(tid(4), "{not json").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedLayout { .. }), "{err:?}");
    }

    #[test]
    fn test_missing_file_is_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = LayoutResolver::new(dir.path());
        let err = resolver.resolve(tid(7)).unwrap_err();
        match err {
            PipelineError::MissingConfig { template_id, path } => {
                assert_eq!(template_id, tid(7));
                assert!(path.ends_with("template_07/layout_config.json"));
            }
            other => panic!("expected MissingConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_reads_template_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("template_07");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(
            folder.join(LAYOUT_FILE_NAME),
            r#"{"sections": {"header": {"y_start": 0.0, "y_end": 0.15}}}"#,
        )
        .unwrap();
        let layout = LayoutResolver::new(dir.path()).resolve(tid(7)).unwrap();
        assert_eq!(layout.template_id, tid(7));
        assert_eq!(layout.sections.len(), 1);
    }

    #[test]
    fn test_shipped_templates_resolve_to_six_sections() {
        let resolver = LayoutResolver::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../templates"));
        for id in 1..=10 {
            let layout = resolver.resolve(tid(id)).unwrap();
            assert_eq!(layout.sections.len(), 6, "template {id}");
            assert!(layout.corrections.is_empty(), "template {id}: {:?}", layout.corrections);
        }
    }
}
