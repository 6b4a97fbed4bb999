use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One document's extracted text plus the artifacts generated from it.
///
/// Fields are private and there are no setters: once created, `full_text` is the only text
/// follow-up answers for this document are grounded on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    index: usize,
    file_name: String,
    full_text: String,
    summary_markdown: String,
    questions_markdown: String,
    created_at: DateTime<Utc>,
}

impl CorpusEntry {
    pub fn new(
        index: usize,
        file_name: String,
        full_text: String,
        summary_markdown: String,
        questions_markdown: String,
    ) -> Self {
        Self {
            index,
            file_name,
            full_text,
            summary_markdown,
            questions_markdown,
            created_at: Utc::now(),
        }
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn summary_markdown(&self) -> &str {
        &self.summary_markdown
    }

    pub fn questions_markdown(&self) -> &str {
        &self.questions_markdown
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
