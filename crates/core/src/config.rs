use crate::fusion::FusionWeights;
use crate::judge::backends::Provider;
use crate::ConfigError;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_JUDGE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_api_key: Option<String>,
}

impl Credentials {
    pub fn for_provider(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::OpenAi => self.openai_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
            Provider::Gemini => self.google_api_key.as_deref(),
        };
        key.map(str::trim).filter(|key| !key.is_empty())
    }

    pub fn require(&self, provider: Provider) -> Result<&str, ConfigError> {
        self.for_provider(provider)
            .ok_or(ConfigError::MissingCredential {
                provider: provider.tag(),
                env_var: provider.env_var(),
            })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("anthropic_api_key", &mask(&self.anthropic_api_key))
            .field("google_api_key", &mask(&self.google_api_key))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct JudgeSettings {
    pub provider: Provider,
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl JudgeSettings {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: None,
            timeout: DEFAULT_JUDGE_TIMEOUT,
        }
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    pub judge: JudgeSettings,
    pub credentials: Credentials,
    pub fusion: FusionWeights,
    /// Upper bound on resumes scored at once; size it to the judge's rate limit.
    pub max_concurrency: usize,
}

impl ScreeningConfig {
    pub fn new(provider: Provider, credentials: Credentials) -> Self {
        Self {
            judge: JudgeSettings::new(provider),
            credentials,
            fusion: FusionWeights::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fusion.validate()?;
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(self.max_concurrency));
        }
        if self.judge.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        url::Url::parse(self.judge.base_url())?;
        self.credentials.require(self.judge.provider)?;
        Ok(())
    }
}
