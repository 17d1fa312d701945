use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::users::repo::UserRepo;

#[derive(Clone)]
pub struct AppState {
    pub users: UserRepo,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connect to the database and bring its schema up to date.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let users = UserRepo::connect(&config.database_url, config.max_connections)
            .await
            .context("connect to database")?;
        users.migrate().await.context("run migrations")?;

        Ok(Self::from_parts(users, Arc::new(config)))
    }

    pub fn from_parts(users: UserRepo, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    /// In-memory database and fixed credentials `admin` / `secret`.
    #[cfg(test)]
    pub async fn fake() -> Self {
        use crate::config::AuthConfig;

        let users = UserRepo::in_memory().await.expect("in-memory database");
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: "sqlite::memory:".into(),
            max_connections: 1,
            auth: AuthConfig {
                username: "admin".into(),
                password: "secret".into(),
            },
        });
        Self::from_parts(users, config)
    }
}
