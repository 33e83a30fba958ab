use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error(
        "API key not found for {provider}. Set {env_var} environment variable or add to config."
    )]
    MissingApiKey { provider: String, env_var: String },

    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("Server overloaded (HTTP 503): {message}")]
    ServerOverloaded { message: String },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Model returned no content{}", .reason.as_ref().map(|r| format!(" (finish reason: {})", r)).unwrap_or_default())]
    EmptyResponse { reason: Option<String> },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid model preset: {0}")]
    InvalidPreset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl LlmError {
    /// Build the error for a non-success HTTP status.
    ///
    /// `retry_after` is the parsed `Retry-After` header, if any.
    pub(crate) fn from_status(status: u16, message: String, retry_after: Option<u64>) -> Self {
        match status {
            429 => LlmError::RateLimited { retry_after },
            503 => LlmError::ServerOverloaded { message },
            _ => LlmError::ApiError {
                message,
                status_code: Some(status),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_rate_limit() {
        let err = LlmError::from_status(429, "slow down".into(), Some(30));
        assert!(matches!(err, LlmError::RateLimited { retry_after: Some(30) }));
        assert_eq!(err.to_string(), "Rate limit exceeded. Retry after 30 seconds");
    }

    #[test]
    fn test_from_status_maps_overload_and_generic() {
        let err = LlmError::from_status(503, "busy".into(), None);
        assert!(matches!(err, LlmError::ServerOverloaded { .. }));

        let err = LlmError::from_status(400, "bad request".into(), None);
        assert_eq!(err.to_string(), "API error (HTTP 400): bad request");
    }
}
