use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential for {provider}: set {env_var}")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("unsupported model: {0} (expected openai, gpt, claude, anthropic, gemini or google)")]
    UnknownProvider(String),

    #[error("invalid fusion weights: {0}")]
    InvalidWeights(String),

    #[error("max concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("judge timeout must be greater than zero")]
    InvalidTimeout,

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("{backend} returned no text content")]
    EmptyContent { backend: &'static str },

    #[error("could not decode {backend} response: {details}")]
    Decode {
        backend: &'static str,
        details: String,
    },
}

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("embedding store error: {0}")]
    Store(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported input {item}: {reason}")]
    InputFormat { item: String, reason: String },

    #[error("screening task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported input {item}: {reason}")]
    InputFormat { item: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<IngestError> for ScreeningError {
    fn from(value: IngestError) -> Self {
        match value {
            IngestError::Io(error) => ScreeningError::Io(error),
            IngestError::InputFormat { item, reason } => {
                ScreeningError::InputFormat { item, reason }
            }
            IngestError::InvalidArgument(details) => ScreeningError::InputFormat {
                item: "<arguments>".to_string(),
                reason: details,
            },
        }
    }
}

pub type Result<T, E = ScreeningError> = std::result::Result<T, E>;
