//! Cross-origin resource sharing configuration.

use std::env;

/// Configuration for the CORS middleware
#[derive(Clone, Debug)]
pub struct CorsConfig {
    /// Allowed origins; `*` admits any origin
    pub allowed_origins: Vec<String>,
    pub allowed_methods: String,
    pub allow_credentials: bool,
    pub max_age_seconds: u32,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: "GET, POST, OPTIONS".to_string(),
            allow_credentials: true,
            max_age_seconds: 3600,
        }
    }
}

impl CorsConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);

        let allow_credentials = env::var("CORS_ALLOW_CREDENTIALS")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        let max_age_seconds = env::var("CORS_MAX_AGE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        Self {
            allowed_origins,
            allow_credentials,
            max_age_seconds,
            ..Self::default()
        }
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}
