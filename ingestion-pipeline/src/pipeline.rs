use std::{sync::Arc, time::Instant};

use serde::Serialize;
use tracing::{info, warn};

use common::{
    storage::{
        corpus_store::CorpusStore,
        types::{corpus_entry::CorpusEntry, document::UploadedDocument},
    },
    utils::{config::AppConfig, llm::CompletionProvider},
};

use crate::{enricher::ArtifactGenerator, utils::file_text_extraction::extract_text_from_document};

/// What happened to one document of an upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    Processed {
        summary_markdown: String,
        questions_markdown: String,
    },
    /// Text could not be extracted; no completion calls were made.
    Skipped { reason: String },
    /// Text was extracted but artifact generation failed.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentOutcome {
    pub index: usize,
    pub file_name: String,
    pub mime_type: String,
    #[serde(flatten)]
    pub status: DocumentStatus,
}

/// Outcomes in upload order plus the corpus built from the processed documents.
#[derive(Debug, Clone, Default)]
pub struct ProcessedBatch {
    pub outcomes: Vec<DocumentOutcome>,
    pub corpus: CorpusStore,
}

impl ProcessedBatch {
    pub fn processed_count(&self) -> usize {
        self.count(|status| matches!(status, DocumentStatus::Processed { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|status| matches!(status, DocumentStatus::Skipped { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|status| matches!(status, DocumentStatus::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&DocumentStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.status))
            .count()
    }
}

pub struct NotesPipeline {
    generator: ArtifactGenerator,
}

impl NotesPipeline {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &AppConfig) -> Self {
        Self {
            generator: ArtifactGenerator::new(
                provider,
                &config.processing_model,
                config.large_document_warn_chars,
            ),
        }
    }

    /// Processes documents one after another, in upload order.
    ///
    /// A document that fails never stops the batch. Only processed documents get a corpus
    /// entry, keyed by their zero-based position in `documents`.
    pub async fn process_batch(&self, documents: Vec<UploadedDocument>) -> ProcessedBatch {
        let started = Instant::now();
        let mut batch = ProcessedBatch::default();

        for (index, document) in documents.into_iter().enumerate() {
            let outcome = self.process_document(index, document, &mut batch.corpus).await;
            batch.outcomes.push(outcome);
        }

        info!(
            documents = batch.outcomes.len(),
            processed = batch.processed_count(),
            skipped = batch.skipped_count(),
            failed = batch.failed_count(),
            elapsed_ms = started.elapsed().as_millis(),
            "Upload batch processed"
        );

        batch
    }

    async fn process_document(
        &self,
        index: usize,
        document: UploadedDocument,
        corpus: &mut CorpusStore,
    ) -> DocumentOutcome {
        let UploadedDocument {
            file_name,
            format,
            mime_type,
            bytes,
        } = document;

        let text = match extract_text_from_document(format, bytes).await {
            Ok(text) => text,
            Err(err) => {
                warn!(index, %file_name, %format, error = %err, "Skipping document");
                return DocumentOutcome {
                    index,
                    file_name,
                    mime_type,
                    status: DocumentStatus::Skipped {
                        reason: err.to_string(),
                    },
                };
            }
        };

        match self.generator.generate(&text).await {
            Ok(artifacts) => {
                info!(index, %file_name, chars = text.len(), "Document processed");
                let status = DocumentStatus::Processed {
                    summary_markdown: artifacts.summary.clone(),
                    questions_markdown: artifacts.questions.clone(),
                };
                corpus.put(
                    index,
                    CorpusEntry::new(
                        index,
                        file_name.clone(),
                        text,
                        artifacts.summary,
                        artifacts.questions,
                    ),
                );
                DocumentOutcome {
                    index,
                    file_name,
                    mime_type,
                    status,
                }
            }
            Err(err) => {
                warn!(index, %file_name, error = %err, "Artifact generation failed");
                DocumentOutcome {
                    index,
                    file_name,
                    mime_type,
                    status: DocumentStatus::Failed {
                        reason: err.to_string(),
                    },
                }
            }
        }
    }
}
