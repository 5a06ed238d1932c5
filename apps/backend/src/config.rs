//! Runtime configuration read from the environment (and `.env`).

use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://mnemosine.db?mode=rwc";
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub generator: GeneratorConfig,
}

/// Settings for the AI content generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Generation is disabled when no key is configured.
    pub api_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
    /// Language for generated test words and mnemonics.
    pub content_language: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            content_language: "Portuguese".to_string(),
        }
    }
}

impl Config {
    /// Load `.env` if present, then read settings from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a number, got {raw:?}"))?,
            Err(_) => 3000,
        };

        let defaults = GeneratorConfig::default();
        let generator = GeneratorConfig {
            api_key: env::var("GEMINI_API_KEY").ok().filter(|key| !key.trim().is_empty()),
            text_model: env::var("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: env::var("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            content_language: env::var("CONTENT_LANGUAGE").unwrap_or(defaults.content_language),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            generator,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
