use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use common::storage::{
    corpus_store::CorpusStore,
    session::{load_corpus, replace_corpus, SessionType},
};
use tracing::{debug, error};

use super::response_middleware::TemplateResponse;

/// The requesting browser session's corpus.
pub struct SessionCorpus(SessionType);

impl SessionCorpus {
    pub fn load(&self) -> CorpusStore {
        load_corpus(&self.0)
    }

    /// Swaps in the corpus of a new upload batch. Entries from earlier uploads are dropped.
    pub fn replace(&self, corpus: &CorpusStore) {
        debug!(entries = corpus.len(), "Replacing session corpus");
        replace_corpus(&self.0, corpus);
    }
}

impl<S> FromRequestParts<S> for SessionCorpus
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionType>()
            .cloned()
            .map(Self)
            .ok_or_else(|| {
                error!("Session layer missing from the router");
                TemplateResponse::server_error().into_response()
            })
    }
}
