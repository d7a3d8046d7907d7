use crate::{ConfigError, FromEnv};
use std::env;

/// Allowed CORS origins for browser clients.
///
/// An empty list means no origin was configured; callers decide whether that
/// is acceptable for the current [`Environment`](crate::Environment).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    pub fn is_configured(&self) -> bool {
        !self.allowed_origins.is_empty()
    }

    fn parse(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl FromEnv for CorsConfig {
    /// Reads the comma-separated `CORS_ALLOWED_ORIGIN` list, if set.
    fn from_env() -> Result<Self, ConfigError> {
        let allowed_origins = env::var("CORS_ALLOWED_ORIGIN")
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default();

        Ok(Self { allowed_origins })
    }
}
