use axum::{
    extract::State,
    response::IntoResponse,
    Form,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{error::AppError, utils::markdown};
use retrieval_pipeline::AnswerState;

use crate::{
    html_state::HtmlState,
    middlewares::{
        response_middleware::{HtmlError, TemplateResponse},
        session_corpus::SessionCorpus,
    },
};

/// Fields stay strings so malformed input renders the error pages instead of a bare rejection.
#[derive(Deserialize)]
pub struct CrossQuestionParams {
    #[serde(default)]
    pub file_index: String,
    #[serde(default)]
    pub question: String,
}

/// Whole numbers parse; a negative index can never name a stored document.
fn parse_file_index(raw: &str) -> Result<usize, AppError> {
    let raw = raw.trim();
    let value: i64 = raw
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid document index: {raw:?}")))?;

    usize::try_from(value).map_err(|_| AppError::NotFound(format!("No document at index {value}")))
}

#[derive(Serialize)]
pub struct AnswerPageData {
    file_index: usize,
    file_name: String,
    question: String,
    answer_html: String,
    answered: bool,
}

pub async fn cross_question(
    State(state): State<HtmlState>,
    session: SessionCorpus,
    Form(form): Form<CrossQuestionParams>,
) -> Result<impl IntoResponse, HtmlError> {
    let question = form.question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Please enter a question".into()).into());
    }

    let file_index = parse_file_index(&form.file_index)?;

    let corpus = session.load();
    debug!(
        file_index,
        question_chars = question.len(),
        stored_documents = corpus.len(),
        "Answering follow-up question"
    );

    let exchange = state
        .answerer
        .answer(&corpus, file_index, question)
        .await?;

    let (answer_html, answered) = match &exchange.answer {
        AnswerState::Answered { markdown } => (markdown::render_markdown(markdown), true),
        AnswerState::Unavailable { .. } => (markdown::unavailable("answer"), false),
    };

    Ok(TemplateResponse::new_template(
        "answer.html",
        AnswerPageData {
            file_index: exchange.document_index,
            file_name: exchange.file_name,
            question: exchange.question,
            answer_html,
            answered,
        },
    ))
}
