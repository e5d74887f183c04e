// src/config/mod.rs
// All tunables load from the environment (.env supported), with defaults
// for everything except the provider API keys.

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct SageConfig {
    // ── Provider credentials (no defaults; absence is a configuration error)
    pub groq_api_key: Option<String>,
    pub gemini_api_key: Option<String>,

    // ── Model selection
    pub groq_model: String,
    pub gemini_model: String,

    // ── Generation parameters per pedagogical mode
    pub chat_max_tokens: u32,
    pub chat_temperature: f32,
    pub reasoning_max_tokens: u32,
    pub reasoning_temperature: f32,

    // ── Timeouts (in seconds)
    pub provider_timeout: u64,
    pub request_timeout: u64,

    // ── Server Configuration
    pub host: String,
    pub port: u16,

    // ── Logging Configuration
    pub log_level: String,
}

// Tolerates values carrying inline comments or stray whitespace, which
// shows up when people hand-edit .env files.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

fn env_var_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SageConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            groq_api_key: env_var_opt("GROQ_API_KEY"),
            gemini_api_key: env_var_opt("GEMINI_API_KEY"),
            groq_model: env_var_or("SAGE_GROQ_MODEL", "llama-3.3-70b-versatile".to_string()),
            gemini_model: env_var_or("SAGE_GEMINI_MODEL", "gemini-2.0-flash".to_string()),
            chat_max_tokens: env_var_or("SAGE_CHAT_MAX_TOKENS", 1024),
            chat_temperature: env_var_or("SAGE_CHAT_TEMPERATURE", 0.7),
            reasoning_max_tokens: env_var_or("SAGE_REASONING_MAX_TOKENS", 4096),
            reasoning_temperature: env_var_or("SAGE_REASONING_TEMPERATURE", 0.2),
            provider_timeout: env_var_or("SAGE_PROVIDER_TIMEOUT", 30),
            request_timeout: env_var_or("SAGE_REQUEST_TIMEOUT", 90),
            host: env_var_or("SAGE_HOST", "0.0.0.0".to_string()),
            port: env_var_or("SAGE_PORT", 3001),
            log_level: env_var_or("SAGE_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-attempt timeout for upstream provider calls
    pub fn provider_timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.provider_timeout)
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<SageConfig> = Lazy::new(SageConfig::from_env);
