use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Model used for summaries and exam questions.
    #[serde(default = "default_processing_model")]
    pub processing_model: String,
    /// Model used for follow-up answers.
    #[serde(default = "default_query_model")]
    pub query_model: String,
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,
    #[serde(default = "default_upload_max_body_bytes")]
    pub upload_max_body_bytes: usize,
    /// Documents longer than this are still sent whole, but logged as likely to exceed the model context.
    #[serde(default = "default_large_document_warn_chars")]
    pub large_document_warn_chars: usize,
    #[serde(default)]
    pub session_secure_cookie: bool,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

const fn default_http_port() -> u16 {
    3000
}

fn default_processing_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_query_model() -> String {
    "gpt-4o".to_string()
}

const fn default_completion_timeout_secs() -> u64 {
    120
}

const fn default_upload_max_body_bytes() -> usize {
    25 * 1024 * 1024
}

const fn default_large_document_warn_chars() -> usize {
    100_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: default_base_url(),
            http_port: default_http_port(),
            processing_model: default_processing_model(),
            query_model: default_query_model(),
            completion_timeout_secs: default_completion_timeout_secs(),
            upload_max_body_bytes: default_upload_max_body_bytes(),
            large_document_warn_chars: default_large_document_warn_chars(),
            session_secure_cookie: false,
        }
    }
}

impl AppConfig {
    pub const fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
