use std::sync::Arc;

use common::{
    create_template_engine,
    storage::session::SessionStoreType,
    utils::{
        config::AppConfig,
        llm::CompletionProvider,
        template_engine::{ProvidesTemplateEngine, TemplateEngine},
    },
};
use ingestion_pipeline::NotesPipeline;
use retrieval_pipeline::FollowUpAnswerer;
use tracing::debug;

#[derive(Clone)]
pub struct HtmlState {
    pub templates: Arc<TemplateEngine>,
    pub session_store: Arc<SessionStoreType>,
    pub config: AppConfig,
    pub notes_pipeline: Arc<NotesPipeline>,
    pub answerer: Arc<FollowUpAnswerer>,
}

impl HtmlState {
    /// Wires the pipelines to one completion provider.
    ///
    /// Summaries and exam questions use `config.processing_model`, follow-up answers use
    /// `config.query_model`.
    pub fn new_with_resources(
        provider: Arc<dyn CompletionProvider>,
        session_store: Arc<SessionStoreType>,
        config: AppConfig,
        template_engine: Option<Arc<TemplateEngine>>,
    ) -> Self {
        let templates =
            template_engine.unwrap_or_else(|| Arc::new(create_template_engine!("templates")));
        debug!("Template engine configured for html_router.");

        let notes_pipeline = Arc::new(NotesPipeline::new(Arc::clone(&provider), &config));
        let answerer = Arc::new(FollowUpAnswerer::new(provider, config.query_model.clone()));

        Self {
            templates,
            session_store,
            config,
            notes_pipeline,
            answerer,
        }
    }
}

impl ProvidesTemplateEngine for HtmlState {
    fn template_engine(&self) -> &Arc<TemplateEngine> {
        &self.templates
    }
}
