mod handlers;

use axum::{extract::DefaultBodyLimit, extract::FromRef, routing::post, Router};
use handlers::upload_files;

use crate::html_state::HtmlState;

pub fn router<S>(max_body_bytes: usize) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    Router::new().route(
        "/upload_files",
        post(upload_files).layer(DefaultBodyLimit::max(max_body_bytes)),
    )
}
