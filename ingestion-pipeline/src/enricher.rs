use std::{sync::Arc, time::Instant};

use common::{
    error::AppError,
    utils::llm::{CompletionPrompt, CompletionProvider},
};
use tracing::{debug, warn};

use crate::utils::llm_instructions::{
    questions_user_message, summary_user_message, QUESTIONS_SYSTEM_MESSAGE,
    SUMMARY_SYSTEM_MESSAGE,
};

/// Summary and exam questions for one document, both in Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentArtifacts {
    pub summary: String,
    pub questions: String,
}

pub struct ArtifactGenerator {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    large_document_warn_chars: usize,
}

impl ArtifactGenerator {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        model: impl Into<String>,
        large_document_warn_chars: usize,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            large_document_warn_chars,
        }
    }

    /// Runs the summary and question completions concurrently.
    ///
    /// Either both artifacts are returned or the first error is, never one without the other.
    /// The text is forwarded whole; no chunking happens here.
    pub async fn generate(&self, text: &str) -> Result<DocumentArtifacts, AppError> {
        let chars = text.chars().count();
        if chars > self.large_document_warn_chars {
            warn!(
                chars,
                limit = self.large_document_warn_chars,
                model = %self.model,
                "Document is large and may exceed the model context window"
            );
        }

        let started = Instant::now();
        let summary = self.provider.complete(CompletionPrompt::new(
            &self.model,
            SUMMARY_SYSTEM_MESSAGE,
            summary_user_message(text),
        ));
        let questions = self.provider.complete(CompletionPrompt::new(
            &self.model,
            QUESTIONS_SYSTEM_MESSAGE,
            questions_user_message(text),
        ));

        let (summary, questions) = tokio::try_join!(summary, questions)?;

        debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis(),
            summary_chars = summary.len(),
            questions_chars = questions.len(),
            "Generated document artifacts"
        );

        Ok(DocumentArtifacts { summary, questions })
    }
}
