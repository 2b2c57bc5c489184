// LogMerge - core/mod.rs
//
// Core business logic layer: grammar, normalisation, aggregation, merge.
// Must NOT depend on: platform or app.

pub mod aggregate;
pub mod discovery;
pub mod export;
pub mod merge;
pub mod model;
pub mod recognizer;
pub mod timestamp;
