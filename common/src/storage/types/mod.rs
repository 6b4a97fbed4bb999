pub mod corpus_entry;
pub mod document;
