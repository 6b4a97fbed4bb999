pub mod answer_retrieval;
pub mod answer_retrieval_helper;

pub use answer_retrieval::{AnswerState, FollowUpAnswerer, FollowUpExchange};
