use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    /// When absent the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub file_url_secret: String,
    pub public_base_url: String,
    pub uploads_dir: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub azure_speech_key: Option<String>,
    pub azure_speech_region: Option<String>,
    pub speech_language: String,
    pub api_rps: u32,
    pub public_rps: u32,
    pub capture_session_idle_secs: u64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let server_address = get_env_or("SERVER_ADDRESS", "0.0.0.0:8080");
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}", server_address));

        let log_format = match get_env_or("LOG_FORMAT", "text").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" => LogFormat::Text,
            other => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {} (expected text or json)",
                    other
                )))
            }
        };

        Ok(Self {
            server_address,
            database_url: get_env_opt("DATABASE_URL"),
            jwt_secret: get_env("JWT_SECRET")?,
            file_url_secret: get_env("FILE_URL_SECRET")?,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
            gemini_api_key: get_env_opt("GEMINI_API_KEY"),
            gemini_model: get_env_or("GEMINI_MODEL", "gemini-2.5-flash"),
            azure_speech_key: get_env_opt("AZURE_SPEECH_KEY"),
            azure_speech_region: get_env_opt("AZURE_SPEECH_REGION"),
            speech_language: get_env_or("SPEECH_LANGUAGE", "es-ES"),
            api_rps: get_env_parse_or("API_RPS", 50)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 20)?,
            capture_session_idle_secs: get_env_parse_or("CAPTURE_SESSION_IDLE_SECS", 1800)?,
            log_format,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}
