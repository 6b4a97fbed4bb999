pub mod corpus_store;
pub mod session;
pub mod types;
