// Post-run dataset tooling: the read-only verifier and the train/val split.

pub mod split;
pub mod verify;

pub use split::split_dataset;
pub use verify::verify_dataset;
