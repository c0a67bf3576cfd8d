use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Resolve from `APP_ENV`, falling back to `NODE_ENV` for existing deployments
    pub fn from_env() -> Self {
        let raw = env::var("APP_ENV").or_else(|_| env::var("NODE_ENV"));
        Self::parse(raw.as_deref().unwrap_or_default())
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Only applied to session cookies in production
    pub cookie_domain: Option<String>,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Set defaults based on environment, then override with specific env vars
        let config = match Environment::from_env() {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        config.with_env_overrides()?.validated()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Some(v) = env::var("PORT").ok().or_else(|| env::var("APP_PORT").ok()) {
            self.server.port = parse_number("PORT", &v)?;
        }

        // Provider overrides
        self.provider.url = env::var("AUTH_PROVIDER_URL")
            .map_err(|_| ConfigError::Missing("AUTH_PROVIDER_URL"))?;
        self.provider.api_key = env::var("AUTH_PROVIDER_KEY")
            .map_err(|_| ConfigError::Missing("AUTH_PROVIDER_KEY"))?;
        if let Ok(v) = env::var("AUTH_PROVIDER_TIMEOUT_SECS") {
            self.provider.timeout_secs = parse_number("AUTH_PROVIDER_TIMEOUT_SECS", &v)?;
        }

        // Database overrides
        self.database.url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_number("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_number("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("COOKIE_DOMAIN") {
            let v = v.trim();
            self.security.cookie_domain = (!v.is_empty()).then(|| v.to_string());
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = parse_origins(&v);
        }

        Ok(self)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let url = url::Url::parse(&self.provider.url).map_err(|e| ConfigError::Invalid {
            name: "AUTH_PROVIDER_URL",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: "AUTH_PROVIDER_URL",
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if self.provider.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("AUTH_PROVIDER_KEY"));
        }
        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            provider: ProviderConfig {
                url: String::new(),
                api_key: String::new(),
                timeout_secs: 30,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 5,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                cookie_domain: None,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            provider: ProviderConfig {
                url: String::new(),
                api_key: String::new(),
                timeout_secs: 15,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                cookie_domain: None,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            provider: ProviderConfig {
                url: String::new(),
                api_key: String::new(),
                timeout_secs: 10,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                cookie_domain: None,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

fn parse_number<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        reason: format!("'{}' is not a valid number", raw),
    })
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
