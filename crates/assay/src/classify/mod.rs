//! Payload shape classification.

mod structure;

pub use structure::{Classification, DataStructure, StructureClassifier};

pub(crate) use structure::passes_trending;
