pub mod config;
pub mod llm;
pub mod markdown;
pub mod template_engine;
