//! Turns a [`Record`] into the field map a document template expects.

use crate::models::resume::Record;
use crate::render::template::{fill_template, TemplateError};

/// Fills `template` with `record`.
pub fn render_document(template: &str, record: &Record) -> Result<String, TemplateError> {
    fill_template(template, &document_fields(record))
}

pub fn document_fields(record: &Record) -> Vec<(&'static str, String)> {
    let info = &record.personal_info;
    vec![
        ("name", escape(&info.name)),
        ("job_title", escape(&info.job_title)),
        ("email", escape(&info.email)),
        ("phone", escape(&info.phone)),
        ("linkedin", escape(&info.linkedin)),
        ("github", escape(&info.github)),
        ("summary", escape(&record.summary)),
        ("education", education_html(record)),
        ("skills", skills_html(record)),
        ("projects", projects_html(record)),
        ("experience", experience_html(record)),
        ("hobbies", escape(&record.hobbies.join(", "))),
    ]
}

fn education_html(record: &Record) -> String {
    match record.education.first() {
        Some(edu) => format!(
            "<p>{} in {}<br>{} ({}–{})</p>",
            escape(&edu.degree),
            escape(&edu.field),
            escape(&edu.institution),
            escape(&edu.start_year),
            escape(&edu.end_year)
        ),
        None => String::new(),
    }
}

fn skills_html(record: &Record) -> String {
    let mut html = String::from("<div class='skills-grid'>");
    for (heading, skills) in record.skills.categories() {
        let joined = skills.iter().map(|s| escape(s)).collect::<Vec<_>>().join(", ");
        html.push_str(&format!(
            "<div class='skill-category'><strong>{heading}:</strong> {joined}</div>"
        ));
    }
    html.push_str("</div>");
    html
}

fn projects_html(record: &Record) -> String {
    let mut html = String::new();
    for project in &record.projects {
        html.push_str(&format!(
            "<div class='project'><strong>{}</strong><ul>",
            escape(&project.title)
        ));
        for bullet in &project.bullets {
            html.push_str(&format!("<li>{}</li>", escape(bullet)));
        }
        html.push_str("</ul></div>");
    }
    html
}

/// Empty experience still renders an (empty) list so the section keeps its place.
fn experience_html(record: &Record) -> String {
    let items: String = record
        .experience
        .iter()
        .map(|bullet| format!("<li>{}</li>", escape(bullet)))
        .collect();
    format!("<div class='experience'><ul>{items}</ul></div>")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
