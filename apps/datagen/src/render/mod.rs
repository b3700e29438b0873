// Renderer boundary: record → filled HTML document, plus the stylesheet
// inlining the PDF converter needs.

pub mod html;
pub mod stylesheet;
pub mod template;

pub use html::render_document;
pub use stylesheet::inline_stylesheet;

/// Document skeleton inside each `template_NN` directory.
pub const TEMPLATE_FILE_NAME: &str = "resume.html";
/// Stylesheet the skeleton links to.
pub const STYLESHEET_FILE_NAME: &str = "style.css";
