use axum::{extract::State, response::IntoResponse};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use common::{error::AppError, storage::types::document::UploadedDocument};
use ingestion_pipeline::DocumentOutcome;

use crate::{
    html_state::HtmlState,
    middlewares::{
        response_middleware::{HtmlError, TemplateResponse},
        session_corpus::SessionCorpus,
    },
};

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    // The request body limit applies instead.
    #[form_data(limit = "unlimited")]
    #[form_data(default)]
    pub files: Vec<FieldData<NamedTempFile>>,
}

#[derive(Serialize)]
pub struct UploadResultsData {
    outcomes: Vec<DocumentOutcome>,
    processed: usize,
    skipped: usize,
    failed: usize,
}

/// Reads every selected file up front, so one disallowed name rejects the whole upload before
/// any completion call is made.
async fn collect_documents(
    files: Vec<FieldData<NamedTempFile>>,
) -> Result<Vec<UploadedDocument>, AppError> {
    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        if let Some(document) = UploadedDocument::from_field_data(file).await? {
            documents.push(document);
        }
    }

    if documents.is_empty() {
        return Err(AppError::Validation("No selected files".into()));
    }

    Ok(documents)
}

pub async fn upload_files(
    State(state): State<HtmlState>,
    session: SessionCorpus,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Result<impl IntoResponse, HtmlError> {
    let documents = collect_documents(input.files).await?;
    info!(documents = documents.len(), "Processing upload batch");

    let batch = state.notes_pipeline.process_batch(documents).await;
    session.replace(&batch.corpus);

    Ok(TemplateResponse::new_template(
        "upload_results.html",
        UploadResultsData {
            processed: batch.processed_count(),
            skipped: batch.skipped_count(),
            failed: batch.failed_count(),
            outcomes: batch.outcomes,
        },
    ))
}
