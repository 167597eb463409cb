//! Decompose/recompose engine

pub mod compose;
pub mod decompose;

pub use compose::{plan_output, OutputComposer, OutputPart, OutputPlan};
pub use decompose::{chapter_file_path, SourceDecomposer};
