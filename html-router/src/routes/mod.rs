pub mod chat;
pub mod index;
pub mod ingestion;
