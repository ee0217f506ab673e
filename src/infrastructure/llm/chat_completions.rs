use async_trait::async_trait;
use serde_json::{Value, json};

use crate::domain::chain::{ProviderSpec, ProviderTransport};
use crate::domain::{DomainError, GenerationRequest};
use crate::infrastructure::http_client::HttpClientTrait;

/// OpenAI-compatible `/chat/completions` transport (Groq, OpenAI, local servers)
#[derive(Debug)]
pub struct ChatCompletionsTransport<C: HttpClientTrait> {
    client: C,
}

impl<C: HttpClientTrait> ChatCompletionsTransport<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    fn chat_completions_url(provider: &ProviderSpec) -> String {
        format!("{}/chat/completions", provider.endpoint())
    }

    fn build_request(provider: &ProviderSpec, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "model": provider.model(),
            "messages": [
                {"role": "system", "content": request.system_prompt_or_default()},
                {"role": "user", "content": request.prompt},
            ],
            "max_tokens": request.max_tokens_or_default(),
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }
}

#[async_trait]
impl<C: HttpClientTrait> ProviderTransport for ChatCompletionsTransport<C> {
    type Request = GenerationRequest;
    type Payload = Value;

    async fn send(
        &self,
        provider: &ProviderSpec,
        request: &GenerationRequest,
    ) -> Result<Value, DomainError> {
        let auth_header = provider.api_key().map(|key| format!("Bearer {}", key));
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(auth) = auth_header.as_deref() {
            headers.push(("Authorization", auth));
        }

        self.client
            .post_json(
                &Self::chat_completions_url(provider),
                headers,
                &Self::build_request(provider, request),
            )
            .await
            .map_err(|e| match e {
                DomainError::Provider { message, .. } => {
                    DomainError::provider(provider.label(), message)
                }
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::{ChainRequest, ChainResult, RetryPolicy};
    use crate::domain::generation::TextGenerationChain;
    use crate::infrastructure::http_client::HttpClient;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn groq(model: &str) -> ProviderSpec {
        ProviderSpec::new("groq", "https://api.groq.com/openai/v1/", model).with_api_key("gsk_test")
    }

    #[test]
    fn test_build_request_uses_defaults() {
        let body = ChatCompletionsTransport::<MockHttpClient>::build_request(
            &groq("llama-3.1-8b-instant"),
            &GenerationRequest::new("chats"),
        );

        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "chats");
        assert!(body.get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_send_posts_to_chat_completions_with_bearer() {
        let client = MockHttpClient::new().with_response(
            "https://api.groq.com/openai/v1/chat/completions",
            json!({"choices": [{"message": {"content": "idea"}}]}),
        );
        let transport = ChatCompletionsTransport::new(client);

        let payload = transport
            .send(&groq("llama-3.1-8b-instant"), &GenerationRequest::new("chats"))
            .await
            .unwrap();

        assert_eq!(payload["choices"][0]["message"]["content"], "idea");

        let requests = transport.client.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0]
            .headers
            .contains(&("Authorization".to_string(), "Bearer gsk_test".to_string())));
    }

    #[tokio::test]
    async fn test_errors_are_labelled_with_provider() {
        let client = MockHttpClient::new().with_error(
            "https://api.groq.com/openai/v1/chat/completions",
            "HTTP 503: overloaded",
        );
        let transport = ChatCompletionsTransport::new(client);

        let err = transport
            .send(&groq("mixtral-8x7b"), &GenerationRequest::new("chats"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Provider error: groq/mixtral-8x7b - HTTP 503: overloaded");
    }

    #[tokio::test]
    async fn test_chain_falls_back_between_models_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "  Un chat qui parle  "}}]
            })))
            .mount(&server)
            .await;

        let chain = TextGenerationChain::new(
            vec![
                ProviderSpec::new("down", "http://127.0.0.1:9", "m1").with_api_key("k"),
                ProviderSpec::new("groq", server.uri(), "m2").with_api_key("k"),
            ],
            RetryPolicy::single_attempt(),
            ChatCompletionsTransport::new(HttpClient::new()),
        )
        .unwrap();

        match chain.execute(&ChainRequest::new(GenerationRequest::new("chats"))).await {
            ChainResult::Success {
                output,
                provider_used,
                attempts_made,
            } => {
                assert_eq!(output, "Un chat qui parle");
                assert_eq!(provider_used, "groq/m2");
                assert_eq!(attempts_made, 2);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }
}
