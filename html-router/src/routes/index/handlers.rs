use axum::response::IntoResponse;
use common::storage::types::document::ALLOWED_EXTENSIONS;
use serde::Serialize;

use crate::middlewares::response_middleware::{HtmlError, TemplateResponse};

#[derive(Serialize)]
pub struct IndexPageData {
    allowed_extensions: &'static [&'static str],
}

/// Upload form. Documents already in the session are listed by the page layout.
pub async fn index_handler() -> Result<impl IntoResponse, HtmlError> {
    Ok(TemplateResponse::new_template(
        "index.html",
        IndexPageData {
            allowed_extensions: ALLOWED_EXTENSIONS,
        },
    ))
}
