/// Number of exam questions requested per document.
pub const EXAM_QUESTION_COUNT: usize = 5;

pub static SUMMARY_SYSTEM_MESSAGE: &str = "You are a helpful assistant that summarizes class notes. Provide the summary in Markdown format.";

pub static QUESTIONS_SYSTEM_MESSAGE: &str = "You are a helpful assistant that creates exam questions based on class notes. Provide the questions in Markdown format.";

pub fn summary_user_message(notes: &str) -> String {
    format!("Please summarize these class notes:\n\n{notes}")
}

pub fn questions_user_message(notes: &str) -> String {
    format!(
        "Based on these class notes, generate {EXAM_QUESTION_COUNT} potential exam questions:\n\n{notes}"
    )
}
