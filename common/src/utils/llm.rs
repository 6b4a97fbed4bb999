use std::{sync::Arc, time::Duration};

use async_openai::types::{
    ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use tracing::debug;

use crate::{error::AppError, utils::config::AppConfig};

pub type OpenAIClientType = async_openai::Client<async_openai::config::OpenAIConfig>;

/// One role-structured call to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPrompt {
    pub model: String,
    pub system: String,
    pub user: String,
}

impl CompletionPrompt {
    pub fn new(model: impl Into<String>, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            user: user.into(),
        }
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the text of a single completion, or an upstream error.
    async fn complete(&self, prompt: CompletionPrompt) -> Result<String, AppError>;
}

pub struct OpenAICompletionProvider {
    client: Arc<OpenAIClientType>,
    timeout: Duration,
}

impl OpenAICompletionProvider {
    pub const fn new(client: Arc<OpenAIClientType>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// The client never retries: the first failed call is returned as is.
    pub fn from_config(config: &AppConfig) -> Self {
        let client = Arc::new(
            async_openai::Client::with_config(
                async_openai::config::OpenAIConfig::new()
                    .with_api_key(&config.openai_api_key)
                    .with_api_base(&config.openai_base_url),
            )
            .with_backoff(no_retry_backoff()),
        );
        Self::new(client, config.completion_timeout())
    }

    fn build_request(prompt: CompletionPrompt) -> Result<CreateChatCompletionRequest, AppError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(prompt.model)
            .messages([
                ChatCompletionRequestSystemMessage::from(prompt.system).into(),
                ChatCompletionRequestUserMessage::from(prompt.user).into(),
            ])
            .build()?;

        Ok(request)
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompletionProvider {
    async fn complete(&self, prompt: CompletionPrompt) -> Result<String, AppError> {
        let model = prompt.model.clone();
        let request = Self::build_request(prompt)?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                AppError::Upstream(format!(
                    "completion with model {model} timed out after {:?}",
                    self.timeout
                ))
            })??;

        debug!(%model, choices = response.choices.len(), "Completion received");

        extract_content(
            response
                .choices
                .first()
                .and_then(|choice| choice.message.content.as_deref()),
        )
    }
}

/// A policy whose retry window is already over after the first attempt.
fn no_retry_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..ExponentialBackoff::default()
    }
}

/// Blank or missing content counts as a failed call.
fn extract_content(content: Option<&str>) -> Result<String, AppError> {
    content
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Upstream("No content found in LLM response".into()))
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    use std::{collections::VecDeque, sync::Mutex};

    use async_trait::async_trait;

    use super::{CompletionPrompt, CompletionProvider};
    use crate::error::AppError;

    type Responder = Box<dyn Fn(&CompletionPrompt) -> Result<String, AppError> + Send + Sync>;

    /// Scripted provider that records every prompt it receives.
    pub struct MockCompletionProvider {
        responder: Responder,
        queued: Mutex<VecDeque<Result<String, AppError>>>,
        calls: Mutex<Vec<CompletionPrompt>>,
    }

    impl MockCompletionProvider {
        pub fn with_responder<F>(responder: F) -> Self
        where
            F: Fn(&CompletionPrompt) -> Result<String, AppError> + Send + Sync + 'static,
        {
            Self {
                responder: Box::new(responder),
                queued: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Always answers with the same text.
        pub fn constant(reply: &str) -> Self {
            let reply = reply.to_string();
            Self::with_responder(move |_| Ok(reply.clone()))
        }

        /// Always fails with an upstream error.
        pub fn failing(message: &str) -> Self {
            let message = message.to_string();
            Self::with_responder(move |_| Err(AppError::Upstream(message.clone())))
        }

        /// Queued replies are served first, in order, before the responder is consulted.
        pub fn push_reply(&self, reply: Result<String, AppError>) {
            if let Ok(mut queued) = self.queued.lock() {
                queued.push_back(reply);
            }
        }

        pub fn calls(&self) -> Vec<CompletionPrompt> {
            self.calls
                .lock()
                .map(|calls| calls.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl CompletionProvider for MockCompletionProvider {
        async fn complete(&self, prompt: CompletionPrompt) -> Result<String, AppError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(prompt.clone());
            }
            let queued = self
                .queued
                .lock()
                .ok()
                .and_then(|mut queued| queued.pop_front());
            match queued {
                Some(reply) => reply,
                None => (self.responder)(&prompt),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_model_and_both_roles() {
        let request = OpenAICompletionProvider::build_request(CompletionPrompt::new(
            "gpt-4o",
            "You are terse.",
            "Say hi",
        ))
        .expect("request should build");

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages.len(), 2);
    }

    #[test]
    fn blank_content_is_an_upstream_failure() {
        assert!(matches!(extract_content(None), Err(AppError::Upstream(_))));
        assert!(matches!(
            extract_content(Some("  \n")),
            Err(AppError::Upstream(_))
        ));
        assert_eq!(
            extract_content(Some("# Summary")).expect("content present"),
            "# Summary"
        );
    }

    #[tokio::test]
    async fn mock_serves_queued_replies_before_responder() {
        let mock = test_support::MockCompletionProvider::constant("fallback");
        mock.push_reply(Ok("first".into()));

        let prompt = CompletionPrompt::new("m", "s", "u");
        assert_eq!(mock.complete(prompt.clone()).await.expect("queued"), "first");
        assert_eq!(mock.complete(prompt).await.expect("responder"), "fallback");
        assert_eq!(mock.calls().len(), 2);
    }

    mod provider {
        use std::{
            sync::{
                atomic::{AtomicUsize, Ordering},
                Arc,
            },
            time::{Duration, Instant},
        };

        use tokio::{
            io::{AsyncReadExt, AsyncWriteExt},
            net::{TcpListener, TcpStream},
        };

        use crate::{
            error::AppError,
            utils::{
                config::AppConfig,
                llm::{CompletionPrompt, CompletionProvider, OpenAICompletionProvider},
            },
        };

        /// Reads one HTTP request: headers plus a `content-length` body.
        async fn read_request(stream: &mut TcpStream) {
            let mut buf = Vec::new();
            let mut chunk = [0_u8; 4096];
            loop {
                let read = stream.read(&mut chunk).await.unwrap_or(0);
                if read == 0 {
                    return;
                }
                buf.extend_from_slice(&chunk[..read]);
                if let Some(end) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                    let length = headers
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|value| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + length {
                        return;
                    }
                }
            }
        }

        /// Serves every request with `reply`, or holds the connection open when `reply` is
        /// `None`. Returns the API base URL and a request counter.
        async fn spawn_server(reply: Option<(&'static str, String)>) -> (String, Arc<AtomicUsize>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            let address = listener.local_addr().expect("local address");
            let requests = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&requests);

            tokio::spawn(async move {
                while let Ok((mut stream, _)) = listener.accept().await {
                    let counter = Arc::clone(&counter);
                    let reply = reply.clone();
                    tokio::spawn(async move {
                        read_request(&mut stream).await;
                        counter.fetch_add(1, Ordering::SeqCst);
                        match reply {
                            Some((status, body)) => {
                                let response = format!(
                                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                                    body.len()
                                );
                                let _ = stream.write_all(response.as_bytes()).await;
                                let _ = stream.shutdown().await;
                            }
                            None => tokio::time::sleep(Duration::from_secs(30)).await,
                        }
                    });
                }
            });

            (format!("http://{address}/v1"), requests)
        }

        fn provider_for(base_url: String, timeout_secs: u64) -> OpenAICompletionProvider {
            OpenAICompletionProvider::from_config(&AppConfig {
                openai_api_key: "test-key".into(),
                openai_base_url: base_url,
                completion_timeout_secs: timeout_secs,
                ..AppConfig::default()
            })
        }

        fn completion_body(content: &str) -> String {
            serde_json::json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1,
                "model": "gpt-4o",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": content },
                    "finish_reason": "stop"
                }]
            })
            .to_string()
        }

        fn prompt() -> CompletionPrompt {
            CompletionPrompt::new("gpt-4o", "You are terse.", "Say hi")
        }

        #[tokio::test]
        async fn returns_the_completion_content() {
            let (base_url, requests) =
                spawn_server(Some(("200 OK", completion_body("## Summary")))).await;

            let reply = provider_for(base_url, 10)
                .complete(prompt())
                .await
                .expect("completion");

            assert_eq!(reply, "## Summary");
            assert_eq!(requests.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn empty_content_is_an_upstream_error() {
            let (base_url, _) = spawn_server(Some(("200 OK", completion_body("")))).await;

            let result = provider_for(base_url, 10).complete(prompt()).await;

            assert!(matches!(result, Err(AppError::Upstream(_))));
        }

        #[tokio::test]
        async fn server_error_is_returned_without_retrying() {
            let (base_url, requests) = spawn_server(Some((
                "500 Internal Server Error",
                r#"{"error":{"message":"boom"}}"#.to_string(),
            )))
            .await;

            let started = Instant::now();
            let err = provider_for(base_url, 10)
                .complete(prompt())
                .await
                .expect_err("a 500 reply fails the call");

            assert_eq!(requests.load(Ordering::SeqCst), 1);
            assert!(matches!(err, AppError::OpenAI(_)), "unexpected error: {err}");
            assert!(err.is_upstream());
            assert!(started.elapsed() < Duration::from_secs(10));
        }

        #[tokio::test]
        async fn hung_service_times_out_as_upstream_error() {
            let (base_url, _) = spawn_server(None).await;

            let result = provider_for(base_url, 1).complete(prompt()).await;

            assert!(matches!(result, Err(AppError::Upstream(msg)) if msg.contains("timed out")));
        }
    }
}
