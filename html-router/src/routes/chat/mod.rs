mod handlers;

use axum::{extract::FromRef, routing::post, Router};
use handlers::cross_question;

use crate::html_state::HtmlState;

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    Router::new().route("/cross_question", post(cross_question))
}
