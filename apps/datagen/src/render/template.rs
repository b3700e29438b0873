//! Placeholder filling for document templates.
//!
//! Markers look like `{{name}}`. The contract is strict in both directions:
//! every field must have exactly one marker in the template, and every marker
//! in the template must have a field. Anything else is a template defect and
//! is reported instead of being papered over.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

static RE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([a-z_]+)\}\}").expect("valid template marker regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template has no marker for field '{0}'")]
    MissingMarker(String),

    #[error("template marker '{0}' appears {1} times; expected once")]
    DuplicateMarker(String, usize),

    #[error("template markers without a field: {}", .0.join(", "))]
    UnmatchedMarkers(Vec<String>),
}

/// Substitutes `fields` into `template`. Pure; see the module docs for the contract.
pub fn fill_template(template: &str, fields: &[(&str, String)]) -> Result<String, TemplateError> {
    let mut marker_counts: HashMap<&str, usize> = HashMap::new();
    for caps in RE_MARKER.captures_iter(template) {
        if let Some(name) = caps.get(1) {
            *marker_counts.entry(name.as_str()).or_default() += 1;
        }
    }

    for (key, _) in fields {
        match marker_counts.get(key).copied().unwrap_or(0) {
            0 => return Err(TemplateError::MissingMarker(key.to_string())),
            1 => {}
            n => return Err(TemplateError::DuplicateMarker(key.to_string(), n)),
        }
    }

    let mut unmatched: Vec<String> = marker_counts
        .keys()
        .filter(|marker| !fields.iter().any(|(key, _)| key == *marker))
        .map(|marker| marker.to_string())
        .collect();
    if !unmatched.is_empty() {
        unmatched.sort();
        return Err(TemplateError::UnmatchedMarkers(unmatched));
    }

    // Single pass over the template, so substituted values are never rescanned.
    let filled = RE_MARKER.replace_all(template, |caps: &Captures<'_>| {
        fields
            .iter()
            .find(|(key, _)| *key == &caps[1])
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    });
    Ok(filled.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&'static str, &str)]) -> Vec<(&'static str, String)> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_fills_every_marker() {
        let out = fill_template(
            "<h1>{{name}}</h1><p>{{email}}</p>",
            &fields(&[("name", "Neha Gupta"), ("email", "neha@x.com")]),
        )
        .unwrap();
        assert_eq!(out, "<h1>Neha Gupta</h1><p>neha@x.com</p>");
    }

    #[test]
    fn test_missing_marker_reported() {
        let err = fill_template("<h1>{{name}}</h1>", &fields(&[("name", "A"), ("email", "b")]))
            .unwrap_err();
        assert_eq!(err, TemplateError::MissingMarker("email".to_string()));
    }

    #[test]
    fn test_duplicate_marker_reported() {
        let err = fill_template("{{name}} {{name}}", &fields(&[("name", "A")])).unwrap_err();
        assert_eq!(err, TemplateError::DuplicateMarker("name".to_string(), 2));
    }

    #[test]
    fn test_unmatched_marker_reported() {
        let err = fill_template("{{name}} {{summary}} {{footer}}", &fields(&[("name", "A")]))
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnmatchedMarkers(vec!["footer".to_string(), "summary".to_string()])
        );
    }

    #[test]
    fn test_values_containing_markers_are_not_rescanned() {
        let out = fill_template("{{a}}|{{b}}", &fields(&[("a", "{{b}}"), ("b", "x")])).unwrap();
        assert_eq!(out, "{{b}}|x");
    }
}
