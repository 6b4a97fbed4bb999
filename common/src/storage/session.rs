use axum_session::{Session, SessionConfig, SessionNullPool, SessionStore};
use tracing::debug;

use crate::{error::AppError, utils::config::AppConfig};

use super::corpus_store::CorpusStore;

pub type SessionType = Session<SessionNullPool>;
pub type SessionStoreType = SessionStore<SessionNullPool>;

/// Session key holding the corpus of the most recent upload batch.
pub const CORPUS_SESSION_KEY: &str = "corpus";

/// Creates the in-memory session store. Session data lives only as long as the process.
pub async fn create_session_store(config: &AppConfig) -> Result<SessionStoreType, AppError> {
    let store = SessionStore::new(
        None,
        SessionConfig::default()
            .with_session_name("notes_session")
            .with_secure(config.session_secure_cookie),
    )
    .await?;
    debug!("In-memory session store ready");
    Ok(store)
}

/// Loads the session's corpus, or an empty one when nothing was uploaded yet.
pub fn load_corpus(session: &SessionType) -> CorpusStore {
    session
        .get::<CorpusStore>(CORPUS_SESSION_KEY)
        .unwrap_or_default()
}

/// Replaces the session's corpus wholesale.
pub fn replace_corpus(session: &SessionType, corpus: &CorpusStore) {
    session.set(CORPUS_SESSION_KEY, corpus);
}
