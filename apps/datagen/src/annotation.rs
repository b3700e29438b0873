//! Annotation Emitter — resolved layout + image size → detection-format label lines.
//!
//! Label format: one line per section,
//! `class_id x_center y_center width height`, space-separated, six decimals,
//! newline-terminated, no header. Coordinates are fractions of the image, so the
//! pixel size only has to be valid, it does not enter the arithmetic.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::errors::PipelineError;
use crate::layout::{ResolvedLayout, SectionRect};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnotationLine {
    pub class_id: u8,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl fmt::Display for AnnotationLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

/// Emits one line per section of `layout`, in layout order.
///
/// Fails with `UnusableImage` when either dimension is zero, which is how an
/// image that did not decode shows up; the caller skips the record rather
/// than write an empty label file.
pub fn emit(
    layout: &ResolvedLayout,
    image_width: u32,
    image_height: u32,
) -> Result<Vec<AnnotationLine>, PipelineError> {
    if image_width == 0 || image_height == 0 {
        return Err(PipelineError::UnusableImage {
            width: image_width,
            height: image_height,
        });
    }

    Ok(layout
        .sections
        .iter()
        .map(|rect| {
            let (x_start, x_end) = clamp_span(rect.x_start, rect.x_end);
            let (y_start, y_end) = clamp_span(rect.y_start, rect.y_end);
            let clamped = (x_start, x_end, y_start, y_end);
            if clamped != (rect.x_start, rect.x_end, rect.y_start, rect.y_end) {
                warn!(
                    template_id = %layout.template_id,
                    section = %rect.class,
                    "Section rectangle outside [0, 1] clamped at emission"
                );
            }
            line_for(rect, x_start, x_end, y_start, y_end)
        })
        .collect())
}

fn clamp_span(start: f64, end: f64) -> (f64, f64) {
    let (a, b) = (start.clamp(0.0, 1.0), end.clamp(0.0, 1.0));
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn line_for(
    rect: &SectionRect,
    x_start: f64,
    x_end: f64,
    y_start: f64,
    y_end: f64,
) -> AnnotationLine {
    AnnotationLine {
        class_id: rect.class.class_id(),
        x_center: (x_start + x_end) / 2.0,
        y_center: (y_start + y_end) / 2.0,
        width: x_end - x_start,
        height: y_end - y_start,
    }
}

/// Serialises lines into label-file content.
pub fn render_label_file(lines: &[AnnotationLine]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

/// Reads pixel dimensions from the image header.
pub fn read_image_dimensions(path: &Path) -> Result<(u32, u32), PipelineError> {
    Ok(image::image_dimensions(path)?)
}

/// Parses a label file back into lines. Used by the verifier.
pub fn parse_label_file(content: &str) -> Result<Vec<AnnotationLine>, String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 5 {
                return Err(format!("line {}: expected 5 fields, found {}", i + 1, fields.len()));
            }
            let class_id = fields[0]
                .parse::<u8>()
                .map_err(|e| format!("line {}: class id: {e}", i + 1))?;
            let mut values = [0.0f64; 4];
            for (slot, raw) in values.iter_mut().zip(&fields[1..]) {
                let value = raw
                    .parse::<f64>()
                    .map_err(|e| format!("line {}: '{raw}': {e}", i + 1))?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(format!("line {}: {raw} outside [0, 1]", i + 1));
                }
                *slot = value;
            }
            Ok(AnnotationLine {
                class_id,
                x_center: values[0],
                y_center: values[1],
                width: values[2],
                height: values[3],
            })
        })
        .collect()
}
