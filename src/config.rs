use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

/// Static credentials checked by the basic-auth middleware.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the config from any key lookup; every key falls back to a default.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("APP_PORT", "8081")
            .parse::<u16>()
            .context("APP_PORT must be a port number")?;

        let auth = AuthConfig {
            username: var("AUTH_USERNAME", "admin"),
            password: var("AUTH_PASSWORD", "admin"),
        };

        Ok(Self {
            host: var("APP_HOST", "0.0.0.0"),
            port,
            database_url: var("DATABASE_URL", "sqlite://users.db"),
            max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            auth,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
