// Per-template section geometry: canonical classes and the layout resolver.
// Pure transforms over layout files; shared read-only across all records.

pub mod resolver;
pub mod section;

pub use resolver::{LayoutResolver, ResolvedLayout, SectionRect};
pub use section::SectionClass;
