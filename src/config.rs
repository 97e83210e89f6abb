use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub provider_base_url: String,
    pub provider_token: String,
    pub provider_account_id: String,
    pub provider_phone_id: String,
    pub service_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://feedbackdesk.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let provider_base_url = env::var("PROVIDER_BASE_URL")
            .unwrap_or_else(|_| "https://graph.facebook.com/v19.0".to_string());

        let provider_token =
            env::var("PROVIDER_TOKEN").map_err(|_| ConfigError::MissingProviderToken)?;

        let provider_account_id =
            env::var("PROVIDER_ACCOUNT_ID").map_err(|_| ConfigError::MissingProviderAccountId)?;

        let provider_phone_id =
            env::var("PROVIDER_PHONE_ID").map_err(|_| ConfigError::MissingProviderPhoneId)?;

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "feedbackdesk".to_string());

        Ok(Config {
            database_url,
            server_host,
            server_port,
            provider_base_url,
            provider_token,
            provider_account_id,
            provider_phone_id,
            service_name,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("PROVIDER_TOKEN environment variable not set")]
    MissingProviderToken,

    #[error("PROVIDER_ACCOUNT_ID environment variable not set")]
    MissingProviderAccountId,

    #[error("PROVIDER_PHONE_ID environment variable not set")]
    MissingProviderPhoneId,

    #[error("Invalid port number")]
    InvalidPort,
}
