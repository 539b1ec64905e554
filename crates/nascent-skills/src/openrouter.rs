//! OpenRouter client: one-model chat for conversations and a parallel
//! fan-out over the free models for autonomous learning.

use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::join_all;
use nascent_core::{ChatCompletion, ChatTurn, MultiModelLearn, MultiModelLearning, Perspective, Role};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3-8b-instruct:free";

const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
const ENV_MODEL: &str = "OPENROUTER_MODEL";
const ENV_APP_NAME: &str = "NASCENT_APP_NAME";
const ENV_APP_URL: &str = "NASCENT_APP_URL";
const PLACEHOLDER_KEY: &str = "your_api_key_here";
const DEFAULT_APP_NAME: &str = "AI Birth Simulation";
const DEFAULT_APP_URL: &str = "http://localhost:8002";

const CHAT_MAX_TOKENS: u32 = 150;
const CHAT_TEMPERATURE: f32 = 0.8;
const CHAT_HISTORY: usize = 10;
const LEARN_MAX_TOKENS: u32 = 100;
const LEARN_TEMPERATURE: f32 = 0.7;
const LEARN_TIMEOUT: Duration = Duration::from_secs(10);
const KNOWLEDGE_PER_PERSPECTIVE: u64 = 15;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeModel {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub specialty: &'static str,
}

pub const FREE_MODELS: [FreeModel; 4] = [
    FreeModel {
        id: "meta-llama/llama-3-8b-instruct:free",
        name: "Meta Llama 3 8B",
        description: "Fast, intelligent, great for conversations",
        specialty: "general",
    },
    FreeModel {
        id: "google/gemma-7b-it:free",
        name: "Google Gemma 7B",
        description: "Balanced performance and creativity",
        specialty: "creative",
    },
    FreeModel {
        id: "mistralai/mistral-7b-instruct:free",
        name: "Mistral 7B",
        description: "Excellent at following instructions",
        specialty: "analytical",
    },
    FreeModel {
        id: "huggingfaceh4/zephyr-7b-beta:free",
        name: "Zephyr 7B",
        description: "Helpful and friendly responses",
        specialty: "emotional",
    },
];

/// Models consulted on every learning cycle.
pub const LEARNING_MODELS: [&str; 3] = [
    "meta-llama/llama-3-8b-instruct:free",
    "google/gemma-7b-it:free",
    "mistralai/mistral-7b-instruct:free",
];

fn model_name(id: &str) -> String {
    FREE_MODELS
        .iter()
        .find(|m| m.id == id)
        .map(|m| m.name.to_string())
        .unwrap_or_else(|| id.to_string())
}

/// Mock never leaves the process; Live calls OpenRouter when a key is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LlmMode {
    #[default]
    Mock,
    Live,
}

impl LlmMode {
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("live") {
            LlmMode::Live
        } else {
            LlmMode::Mock
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenRouterSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub app_name: String,
    pub app_url: String,
    pub endpoint: String,
}

impl OpenRouterSettings {
    /// Reads `OPENROUTER_API_KEY`, `OPENROUTER_MODEL`, `NASCENT_APP_NAME` and `NASCENT_APP_URL`.
    pub fn from_env() -> Self {
        let var = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        Self {
            api_key: var(ENV_API_KEY),
            model: var(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            app_name: var(ENV_APP_NAME).unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            app_url: var(ENV_APP_URL).unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            endpoint: OPENROUTER_API_URL.to_string(),
        }
    }

    /// True when a real key (not empty, not the template placeholder) is present.
    pub fn is_configured(&self) -> bool {
        matches!(self.api_key.as_deref(), Some(k) if !k.trim().is_empty() && k != PLACEHOLDER_KEY)
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

pub struct OpenRouterClient {
    http: reqwest::Client,
    settings: OpenRouterSettings,
    mode: LlmMode,
}

impl OpenRouterClient {
    pub fn new(settings: OpenRouterSettings, mode: LlmMode) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { http, settings, mode }
    }

    pub fn from_env(mode: LlmMode) -> Self {
        Self::new(OpenRouterSettings::from_env(), mode)
    }

    /// Points the client at another endpoint (local proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.settings.endpoint = endpoint.into();
        self
    }

    pub fn mode(&self) -> LlmMode {
        self.mode
    }

    /// Whether requests will actually be sent.
    pub fn is_available(&self) -> bool {
        self.mode == LlmMode::Live && self.settings.is_configured()
    }

    async fn post(&self, model: &str, messages: &[Value], max_tokens: u32, temperature: f32) -> Result<String, BoxError> {
        let key = self.settings.api_key.as_deref().unwrap_or_default();
        let body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": max_tokens,
            "temperature": temperature,
        });
        let response = self
            .http
            .post(&self.settings.endpoint)
            .bearer_auth(key)
            .header("HTTP-Referer", &self.settings.app_url)
            .header("X-Title", &self.settings.app_name)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("OpenRouter returned {}: {}", status, detail).into());
        }
        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| "unexpected OpenRouter response format".into())
    }

    /// Chat completion with the configured model; the last ten history turns
    /// are sent as context.
    pub async fn chat(&self, prompt: &str, history: &[ChatTurn], system_prompt: &str) -> Result<String, BoxError> {
        let mut messages = Vec::with_capacity(history.len().min(CHAT_HISTORY) + 2);
        if !system_prompt.is_empty() {
            messages.push(json!({ "role": "system", "content": system_prompt }));
        }
        let skip = history.len().saturating_sub(CHAT_HISTORY);
        for turn in history.iter().skip(skip) {
            let role = match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(json!({ "role": role, "content": turn.text }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        tracing::debug!(model = %self.settings.model, messages = messages.len(), "Calling OpenRouter");
        self.post(&self.settings.model, &messages, CHAT_MAX_TOKENS, CHAT_TEMPERATURE)
            .await
    }

    /// Asks every learning model in parallel; models that fail are dropped.
    pub async fn learn_from_models(&self, topic: &str, context: &str) -> Option<MultiModelLearning> {
        let system_prompt = format!(
            "You are a teacher helping an AI child learn. {}\nKeep your response to 1-2 sentences with the most important insight.",
            context
        );
        let messages = [
            json!({ "role": "system", "content": system_prompt }),
            json!({ "role": "user", "content": topic }),
        ];

        tracing::info!(topic, "Multi-model learning initiated");
        let calls = LEARNING_MODELS.iter().map(|model| {
            let messages = &messages;
            async move {
                match self.post(model, messages, LEARN_MAX_TOKENS, LEARN_TEMPERATURE).await {
                    Ok(insight) => Some(Perspective {
                        model: model.to_string(),
                        model_name: model_name(model),
                        insight,
                    }),
                    Err(e) => {
                        tracing::warn!(model, error = %e, "Model query failed");
                        None
                    }
                }
            }
        });

        let perspectives: Vec<Perspective> = match tokio::time::timeout(LEARN_TIMEOUT, join_all(calls)).await {
            Ok(results) => results.into_iter().flatten().collect(),
            Err(_) => {
                tracing::warn!(topic, "Multi-model learning timed out");
                return None;
            }
        };
        if perspectives.is_empty() {
            return None;
        }
        tracing::info!(models = perspectives.len(), "Learned from models");
        Some(MultiModelLearning {
            topic: topic.to_string(),
            knowledge_gained: perspectives.len() as u64 * KNOWLEDGE_PER_PERSPECTIVE,
            perspectives,
            timestamp: Utc::now(),
        })
    }
}

#[async_trait]
impl ChatCompletion for OpenRouterClient {
    async fn complete(&self, prompt: &str, history: &[ChatTurn], system_prompt: &str) -> Option<String> {
        if !self.is_available() {
            return None;
        }
        match self.chat(prompt, history, system_prompt).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::error!(error = %e, "OpenRouter chat failed; using fallback");
                None
            }
        }
    }
}

#[async_trait]
impl MultiModelLearn for OpenRouterClient {
    async fn learn(&self, topic: &str, context: &str) -> Option<MultiModelLearning> {
        if !self.is_available() {
            return None;
        }
        self.learn_from_models(topic, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn settings(key: &str) -> OpenRouterSettings {
        OpenRouterSettings {
            api_key: Some(key.to_string()),
            model: DEFAULT_MODEL.to_string(),
            app_name: "Test Birth".to_string(),
            app_url: "http://test.local".to_string(),
            endpoint: OPENROUTER_API_URL.to_string(),
        }
    }

    fn completion(content: &str) -> String {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }).to_string()
    }

    #[test]
    fn placeholder_or_empty_key_is_not_configured() {
        assert!(!settings(PLACEHOLDER_KEY).is_configured());
        assert!(!settings("  ").is_configured());
        assert!(settings("sk-or-123").is_configured());
        let none = OpenRouterSettings { api_key: None, ..settings("x") };
        assert!(!none.is_configured());
    }

    #[tokio::test]
    async fn chat_sends_headers_and_trims_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/chat/completions")
            .match_header("authorization", "Bearer sk-or-123")
            .match_header("x-title", "Test Birth")
            .match_header("http-referer", "http://test.local")
            .match_body(Matcher::PartialJson(json!({
                "model": DEFAULT_MODEL,
                "max_tokens": 150
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion("  I feel your warmth.  "))
            .create_async()
            .await;

        let client = OpenRouterClient::new(settings("sk-or-123"), LlmMode::Live)
            .with_endpoint(format!("{}/api/v1/chat/completions", server.url()));
        let history = vec![ChatTurn { role: Role::User, text: "hi".into() }];
        let reply = client.complete("hello", &history, "be kind").await;

        assert_eq!(reply.as_deref(), Some("I feel your warmth."));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn chat_error_status_yields_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":"rate limited"}"#)
            .create_async()
            .await;

        let client = OpenRouterClient::new(settings("sk-or-123"), LlmMode::Live)
            .with_endpoint(format!("{}/api/v1/chat/completions", server.url()));
        assert!(client.complete("hello", &[], "").await.is_none());
    }

    #[tokio::test]
    async fn learning_accepts_partial_results() {
        let mut server = mockito::Server::new_async().await;
        let path = "/api/v1/chat/completions";
        let _llama = server
            .mock("POST", path)
            .match_body(Matcher::PartialJson(json!({ "model": LEARNING_MODELS[0], "max_tokens": 100 })))
            .with_status(200)
            .with_body(completion("Love is attention."))
            .create_async()
            .await;
        let _gemma = server
            .mock("POST", path)
            .match_body(Matcher::PartialJson(json!({ "model": LEARNING_MODELS[1] })))
            .with_status(500)
            .create_async()
            .await;
        let _mistral = server
            .mock("POST", path)
            .match_body(Matcher::PartialJson(json!({ "model": LEARNING_MODELS[2] })))
            .with_status(200)
            .with_body(completion("Love is care in action."))
            .create_async()
            .await;

        let client = OpenRouterClient::new(settings("sk-or-123"), LlmMode::Live)
            .with_endpoint(format!("{}{}", server.url(), path));
        let learned = client.learn("What is love?", "Teach gently.").await.unwrap();

        assert_eq!(learned.topic, "What is love?");
        assert_eq!(learned.perspectives.len(), 2);
        assert_eq!(learned.knowledge_gained, 30);
        assert_eq!(learned.perspectives[0].model_name, "Meta Llama 3 8B");
        assert_eq!(learned.perspectives[1].model_name, "Mistral 7B");
        assert_eq!(learned.perspectives[1].insight, "Love is care in action.");
    }

    #[tokio::test]
    async fn mock_mode_or_missing_key_never_calls_out() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/chat/completions")
            .expect(0)
            .create_async()
            .await;
        let endpoint = format!("{}/api/v1/chat/completions", server.url());

        let mock_mode = OpenRouterClient::new(settings("sk-or-123"), LlmMode::Mock).with_endpoint(endpoint.clone());
        assert!(mock_mode.complete("hi", &[], "").await.is_none());
        assert!(mock_mode.learn("What is art?", "").await.is_none());

        let unconfigured = OpenRouterClient::new(settings(PLACEHOLDER_KEY), LlmMode::Live).with_endpoint(endpoint);
        assert!(!unconfigured.is_available());
        assert!(unconfigured.learn("What is art?", "").await.is_none());

        mock.assert_async().await;
    }

    #[test]
    fn llm_mode_parses_leniently() {
        assert_eq!(LlmMode::parse("LIVE"), LlmMode::Live);
        assert_eq!(LlmMode::parse("mock"), LlmMode::Mock);
        assert_eq!(LlmMode::parse("anything"), LlmMode::Mock);
    }
}
