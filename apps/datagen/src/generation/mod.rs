// Synthetic record generation: static content pools and the seeded factory that
// draws from them. Every draw goes through a caller-supplied generator handle.

pub mod pools;
pub mod record_factory;

pub use record_factory::{generate_record, record_file_name};
