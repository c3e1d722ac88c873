//! Rate limiting configuration and route group policy table.

use crate::{error::ConfigError, services::rate_limit::Policy};
use actix_web::http::Method;
use std::{env, str::FromStr, time::Duration};

pub const DEFAULT_POLICY: &str = "default";
pub const PROFILE_POLICY: &str = "profile";
pub const MUTATING_POLICY: &str = "mutating";

/// Paths that are never rate limited
const EXEMPT_PATHS: [&str; 5] = ["/", "/health", "/metrics", "/docs", "/openapi.json"];

/// Configuration for rate limiting
///
/// Holds one policy per route group. Request-to-policy mapping is static and
/// lives in [`RateLimitConfig::policy_for`].
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub default: Policy,
    pub profile: Policy,
    pub mutating: Policy,
    /// Take the client identity from `X-Forwarded-For`/`X-Real-IP`
    pub trust_forwarded_headers: bool,
    pub sweep_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default: builtin(DEFAULT_POLICY, 100, 60),
            profile: builtin(PROFILE_POLICY, 30, 60),
            mutating: builtin(MUTATING_POLICY, 5, 60),
            trust_forwarded_headers: false,
            sweep_interval_seconds: 300,
        }
    }
}

fn builtin(id: &str, limit: u64, period_seconds: u64) -> Policy {
    match Policy::new(id, limit, Duration::from_secs(period_seconds)) {
        Ok(policy) => policy,
        Err(err) => unreachable!("built-in policy {id} is invalid: {err}"),
    }
}

impl RateLimitConfig {
    /// Load configuration from environment variables, falling back to defaults
    ///
    /// Unlike the other config loaders this one is strict: a value that does
    /// not parse, or a zero limit or period, stops the process from starting.
    pub fn from_env() -> Result<Self, ConfigError> {
        let enabled = env_parse("RATE_LIMIT_ENABLED", true, parse_bool)?;

        let default = policy_from_env(DEFAULT_POLICY, "RATE_LIMIT_RPM", "RATE_LIMIT_PERIOD", 100, 60)?;
        let profile = policy_from_env(
            PROFILE_POLICY,
            "RATE_LIMIT_PROFILE_RPM",
            "RATE_LIMIT_PROFILE_PERIOD",
            30,
            60,
        )?;
        let mutating = policy_from_env(
            MUTATING_POLICY,
            "RATE_LIMIT_MUTATING_RPM",
            "RATE_LIMIT_MUTATING_PERIOD",
            5,
            60,
        )?;

        let trust_forwarded_headers = env_parse("RATE_LIMIT_TRUST_PROXY", false, parse_bool)?;

        let sweep_interval_seconds =
            env_parse("RATE_LIMIT_SWEEP_INTERVAL", 300, u64::from_str)?;
        if sweep_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RATE_LIMIT_SWEEP_INTERVAL".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            enabled,
            default,
            profile,
            mutating,
            trust_forwarded_headers,
            sweep_interval_seconds,
        })
    }

    /// Pick the policy for a request, or `None` when the route is exempt
    pub fn policy_for(&self, method: &Method, path: &str) -> Option<&Policy> {
        if *method == Method::OPTIONS || EXEMPT_PATHS.contains(&path) {
            return None;
        }

        if matches!(
            *method,
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE
        ) {
            return Some(&self.mutating);
        }

        if path == "/profile" || path.starts_with("/profile/") {
            return Some(&self.profile);
        }

        Some(&self.default)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

fn policy_from_env(
    id: &str,
    limit_key: &str,
    period_key: &str,
    default_limit: u64,
    default_period: u64,
) -> Result<Policy, ConfigError> {
    let limit = env_parse(limit_key, default_limit, u64::from_str)?;
    let period_seconds = env_parse(period_key, default_period, u64::from_str)?;
    Policy::new(id, limit, Duration::from_secs(period_seconds))
}

pub(crate) fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(()),
    }
}

/// Read `key`, returning `default` when unset and an error when unparsable
pub(crate) fn env_parse<T, E>(
    key: &str,
    default: T,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => parse(value.trim()).map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;

    const KEYS: [&str; 9] = [
        "RATE_LIMIT_ENABLED",
        "RATE_LIMIT_RPM",
        "RATE_LIMIT_PERIOD",
        "RATE_LIMIT_PROFILE_RPM",
        "RATE_LIMIT_PROFILE_PERIOD",
        "RATE_LIMIT_MUTATING_RPM",
        "RATE_LIMIT_MUTATING_PERIOD",
        "RATE_LIMIT_TRUST_PROXY",
        "RATE_LIMIT_SWEEP_INTERVAL",
    ];

    fn clear() {
        for key in KEYS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_rate_limit_config_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear();

        let config = RateLimitConfig::from_env().unwrap();
        assert!(config.enabled);
        assert_eq!(config.default.limit(), 100);
        assert_eq!(config.profile.limit(), 30);
        assert_eq!(config.mutating.limit(), 5);
        assert_eq!(config.mutating.window(), Duration::from_secs(60));
        assert!(!config.trust_forwarded_headers);
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_rate_limit_config_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear();
        unsafe {
            env::set_var("RATE_LIMIT_ENABLED", "FALSE");
            env::set_var("RATE_LIMIT_PROFILE_RPM", "3");
            env::set_var("RATE_LIMIT_PROFILE_PERIOD", "120");
            env::set_var("RATE_LIMIT_TRUST_PROXY", "true");
        }

        let config = RateLimitConfig::from_env().unwrap();
        assert!(!config.enabled);
        assert_eq!(config.profile.limit(), 3);
        assert_eq!(config.profile.window(), Duration::from_secs(120));
        assert!(config.trust_forwarded_headers);

        clear();
    }

    #[test]
    fn test_zero_limit_is_a_configuration_error() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear();
        unsafe {
            env::set_var("RATE_LIMIT_MUTATING_RPM", "0");
        }

        let err = RateLimitConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveLimit { ref policy } if policy == "mutating"));

        clear();
    }

    #[test]
    fn test_oversized_period_is_a_configuration_error() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear();
        unsafe {
            env::set_var("RATE_LIMIT_PERIOD", "10000000000000");
        }

        let err = RateLimitConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::WindowOutOfRange { ref policy } if policy == "default"));

        clear();
    }

    #[test]
    fn test_unparsable_values_are_configuration_errors() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear();
        unsafe {
            env::set_var("RATE_LIMIT_PERIOD", "-60");
        }
        assert!(matches!(
            RateLimitConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));

        clear();
        unsafe {
            env::set_var("RATE_LIMIT_ENABLED", "sometimes");
        }
        assert!(matches!(
            RateLimitConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));

        clear();
    }

    #[test]
    fn test_policy_selection() {
        let config = RateLimitConfig::default();

        let select = |method: Method, path: &str| config.policy_for(&method, path).map(|p| p.id().to_string());

        assert_eq!(select(Method::GET, "/profile").as_deref(), Some("profile"));
        assert_eq!(select(Method::GET, "/profile/quotes").as_deref(), Some("profile"));
        assert_eq!(select(Method::GET, "/profiles").as_deref(), Some("default"));
        assert_eq!(select(Method::GET, "/talks").as_deref(), Some("default"));
        assert_eq!(
            select(Method::POST, "/talks/intro/questions").as_deref(),
            Some("mutating")
        );
        assert_eq!(select(Method::GET, "/health"), None);
        assert_eq!(select(Method::GET, "/openapi.json"), None);
        assert_eq!(select(Method::OPTIONS, "/talks"), None);
    }
}
