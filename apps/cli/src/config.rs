use anyhow::Context;

/// Runtime configuration, read once at startup and injected into the API
/// client. Nothing in the library crates reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = std::env::var("FINBOOKS_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let api_token =
            std::env::var("FINBOOKS_API_TOKEN").context("FINBOOKS_API_TOKEN must be set")?;

        Ok(Config { api_url, api_token })
    }
}
