use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty values are treated as unset so `.env` templates can leave keys blank.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("REMITFIND_ENV", "development"))?;
    let log_level = or_default("REMITFIND_LOG_LEVEL", "info");

    let api_base_url = validate_base_url(
        "REMITFIND_API_BASE_URL",
        &or_default("REMITFIND_API_BASE_URL", DEFAULT_API_BASE_URL),
    )?;
    let advisor_base_url = match optional("REMITFIND_ADVISOR_BASE_URL") {
        Some(url) => validate_base_url("REMITFIND_ADVISOR_BASE_URL", &url)?,
        None => api_base_url.clone(),
    };
    let brand_config_url = optional("REMITFIND_BRAND_CONFIG_URL")
        .map(|url| validate_base_url("REMITFIND_BRAND_CONFIG_URL", &url))
        .transpose()?;
    let aliases_path = optional("REMITFIND_ALIASES_PATH").map(PathBuf::from);

    let request_timeout_secs = parse_u64("REMITFIND_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "REMITFIND_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let user_agent = or_default("REMITFIND_USER_AGENT", "remitfind/0.1 (best-rate)");
    let travel_speed_kmh = parse_speed(&or_default("REMITFIND_TRAVEL_SPEED_KMH", "40"))?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        advisor_base_url,
        brand_config_url,
        aliases_path,
        request_timeout_secs,
        user_agent,
        travel_speed_kmh,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REMITFIND_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_speed(raw: &str) -> Result<f64, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "REMITFIND_TRAVEL_SPEED_KMH".to_string(),
        reason,
    };
    let speed = raw.parse::<f64>().map_err(|e| invalid(e.to_string()))?;
    if !speed.is_finite() || speed <= 0.0 {
        return Err(invalid(format!("must be a positive number, got {raw}")));
    }
    Ok(speed)
}

fn validate_base_url(var: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected an http(s) URL, got '{trimmed}'"),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
