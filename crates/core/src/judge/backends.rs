use crate::config::{Credentials, JudgeSettings};
use crate::traits::JudgeBackend;
use crate::{BackendError, ConfigError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
}

impl Provider {
    pub fn tag(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Gemini => "GOOGLE_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4-turbo-preview",
            Provider::Anthropic => "claude-3-opus-20240229",
            Provider::Gemini => "gemini-pro",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Gemini => "https://generativelanguage.googleapis.com",
        }
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "gpt" => Ok(Provider::OpenAi),
            "claude" | "anthropic" => Ok(Provider::Anthropic),
            "gemini" | "google" => Ok(Provider::Gemini),
            _ => Err(ConfigError::UnknownProvider(value.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

pub struct HttpJudgeBackend {
    provider: Provider,
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    base_url: String,
}

impl HttpJudgeBackend {
    pub fn new(settings: &JudgeSettings, credentials: &Credentials) -> Result<Self, ConfigError> {
        let api_key = credentials.require(settings.provider)?.to_string();
        let base_url = url::Url::parse(settings.base_url())?;

        Ok(Self {
            provider: settings.provider,
            client: Client::new(),
            api_key,
            model: settings.model().to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    async fn call_openai(&self, system: &str, user: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "temperature": self.temperature,
                "max_tokens": self.max_tokens,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user},
                ],
            }))
            .send()
            .await?;

        let parsed: OpenAiResponse = read_success(response, "openai").await?;
        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(BackendError::EmptyContent { backend: "openai" })
    }

    async fn call_anthropic(&self, system: &str, user: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "system": system,
                "messages": [{"role": "user", "content": user}],
            }))
            .send()
            .await?;

        let parsed: AnthropicResponse = read_success(response, "anthropic").await?;
        parsed
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .find_map(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(BackendError::EmptyContent {
                backend: "anthropic",
            })
    }

    async fn call_gemini(&self, system: &str, user: &str) -> Result<String, BackendError> {
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "systemInstruction": {"parts": [{"text": system}]},
                "contents": [{"role": "user", "parts": [{"text": user}]}],
                "generationConfig": {
                    "temperature": self.temperature,
                    "maxOutputTokens": self.max_tokens,
                },
            }))
            .send()
            .await?;

        let parsed: GeminiResponse = read_success(response, "gemini").await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(BackendError::EmptyContent { backend: "gemini" });
        }
        Ok(text)
    }
}

#[async_trait]
impl JudgeBackend for HttpJudgeBackend {
    fn name(&self) -> &str {
        self.provider.tag()
    }

    async fn generate_structured_judgment(
        &self,
        system_instruction: &str,
        user_instruction: &str,
    ) -> Result<String, BackendError> {
        debug!(provider = %self.provider, model = %self.model, "judge request");
        match self.provider {
            Provider::OpenAi => self.call_openai(system_instruction, user_instruction).await,
            Provider::Anthropic => {
                self.call_anthropic(system_instruction, user_instruction)
                    .await
            }
            Provider::Gemini => self.call_gemini(system_instruction, user_instruction).await,
        }
    }
}

async fn read_success<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    backend: &'static str,
) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|error| BackendError::Decode {
        backend,
        details: error.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}
