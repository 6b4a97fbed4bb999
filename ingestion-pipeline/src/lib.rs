#![allow(clippy::missing_docs_in_private_items, clippy::result_large_err)]

pub mod enricher;
pub mod pipeline;
pub mod utils;

pub use enricher::{ArtifactGenerator, DocumentArtifacts};
pub use pipeline::{DocumentOutcome, DocumentStatus, NotesPipeline, ProcessedBatch};
