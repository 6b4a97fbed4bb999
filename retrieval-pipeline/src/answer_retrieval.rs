use std::{sync::Arc, time::Instant};

use serde::Serialize;
use tracing::{debug, warn};

use common::{
    error::AppError,
    storage::corpus_store::CorpusStore,
    utils::llm::{CompletionPrompt, CompletionProvider},
};

use super::answer_retrieval_helper::{create_user_message, FOLLOW_UP_SYSTEM_PROMPT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnswerState {
    Answered { markdown: String },
    /// The completion service failed; the page still renders, without an answer.
    Unavailable { reason: String },
}

/// One question and its answer. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowUpExchange {
    pub document_index: usize,
    pub file_name: String,
    pub question: String,
    pub answer: AnswerState,
}

/// Answers free-form questions about a stored document.
///
/// Every question is grounded only on the document's stored `full_text`; earlier questions
/// and answers are not fed back in.
pub struct FollowUpAnswerer {
    provider: Arc<dyn CompletionProvider>,
    model: String,
}

impl FollowUpAnswerer {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Returns `AppError::NotFound` when `document_index` has no corpus entry.
    pub async fn answer(
        &self,
        corpus: &CorpusStore,
        document_index: usize,
        question: &str,
    ) -> Result<FollowUpExchange, AppError> {
        let entry = corpus.get(document_index).ok_or_else(|| {
            AppError::NotFound(format!("No document at index {document_index}"))
        })?;

        let started = Instant::now();
        let prompt = CompletionPrompt::new(
            &self.model,
            FOLLOW_UP_SYSTEM_PROMPT,
            create_user_message(question, entry.full_text()),
        );

        let answer = match self.provider.complete(prompt).await {
            Ok(markdown) => {
                debug!(
                    document_index,
                    model = %self.model,
                    question_chars = question.len(),
                    answer_chars = markdown.len(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Follow-up answered"
                );
                AnswerState::Answered { markdown }
            }
            Err(err) if err.is_upstream() => {
                warn!(document_index, model = %self.model, error = %err, "Follow-up answer unavailable");
                AnswerState::Unavailable {
                    reason: err.to_string(),
                }
            }
            Err(err) => return Err(err),
        };

        Ok(FollowUpExchange {
            document_index,
            file_name: entry.file_name().to_string(),
            question: question.to_string(),
            answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{
        storage::types::corpus_entry::CorpusEntry,
        utils::llm::test_support::MockCompletionProvider,
    };

    const NOTES: &str = "Photosynthesis converts light to chemical energy.";

    fn corpus() -> CorpusStore {
        let mut corpus = CorpusStore::new();
        corpus.put(
            0,
            CorpusEntry::new(
                0,
                "bio.pdf".into(),
                NOTES.into(),
                "## Summary".into(),
                "1. Q".into(),
            ),
        );
        corpus
    }

    #[tokio::test]
    async fn answer_is_grounded_on_the_stored_text() {
        let mock = Arc::new(MockCompletionProvider::constant(
            "The input is **light** energy.",
        ));
        let answerer = FollowUpAnswerer::new(mock.clone(), "gpt-4o");

        let exchange = answerer
            .answer(&corpus(), 0, "What is the input to photosynthesis?")
            .await
            .expect("answer");

        assert_eq!(exchange.file_name, "bio.pdf");
        assert_eq!(
            exchange.answer,
            AnswerState::Answered {
                markdown: "The input is **light** energy.".into()
            }
        );

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gpt-4o");
        assert_eq!(calls[0].system, FOLLOW_UP_SYSTEM_PROMPT);
        assert!(calls[0].user.contains("What is the input to photosynthesis?"));
        assert!(calls[0].user.ends_with(NOTES));
    }

    #[tokio::test]
    async fn unknown_index_is_not_found_for_any_question() {
        let mock = Arc::new(MockCompletionProvider::constant("unused"));
        let answerer = FollowUpAnswerer::new(mock.clone(), "gpt-4o");
        let corpus = corpus();

        for question in ["", "What is light?", "Explain everything"] {
            let result = answerer.answer(&corpus, 99, question).await;
            assert!(matches!(result, Err(AppError::NotFound(_))));
        }
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn questions_never_change_the_stored_entry() {
        let mock = Arc::new(MockCompletionProvider::constant("answer"));
        let answerer = FollowUpAnswerer::new(mock.clone(), "gpt-4o");
        let corpus = corpus();
        let before = corpus.clone();

        answerer.answer(&corpus, 0, "first?").await.expect("first");
        answerer.answer(&corpus, 0, "second?").await.expect("second");

        assert_eq!(corpus, before);
        let calls = mock.calls();
        assert!(!calls[1].user.contains("first?"));
        assert!(calls.iter().all(|call| call.user.ends_with(NOTES)));
    }

    #[tokio::test]
    async fn upstream_failure_reports_unavailable_answer() {
        let answerer = FollowUpAnswerer::new(
            Arc::new(MockCompletionProvider::failing("timed out")),
            "gpt-4o",
        );

        let exchange = answerer
            .answer(&corpus(), 0, "What is chlorophyll?")
            .await
            .expect("upstream failure does not fail the exchange");

        assert!(matches!(
            exchange.answer,
            AnswerState::Unavailable { reason } if reason.contains("timed out")
        ));
    }

    #[test]
    fn exchange_serializes_answer_state() {
        let exchange = FollowUpExchange {
            document_index: 1,
            file_name: "a.pdf".into(),
            question: "q".into(),
            answer: AnswerState::Unavailable {
                reason: "down".into(),
            },
        };

        let value = serde_json::to_value(&exchange).expect("serialize");
        assert_eq!(value["answer"]["state"], "unavailable");
    }
}
