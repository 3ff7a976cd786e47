use std::env;
use std::time::Duration;
use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};

#[derive(Debug, Clone)]
pub enum DatabaseConfig {
    Url(String),
    Parts {
        host: String,
        port: u16,
        username: String,
        password: String,
        database: String,
        ssl_mode: String,
    },
}

impl DatabaseConfig {
    /// `DATABASE_URL` wins; otherwise the split `DATABASE_*` variables are used
    /// when a password is present. Neither means no database is configured.
    pub fn from_env() -> Result<Option<Self>> {
        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                return Ok(Some(Self::Url(url)));
            }
        }

        let password = match env::var("DATABASE_PASSWORD") {
            Ok(password) => password,
            Err(_) => return Ok(None),
        };

        Ok(Some(Self::Parts {
            host: env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("DATABASE_PORT")
                .unwrap_or_else(|_| "5432".to_string())
                .parse()?,
            username: env::var("DATABASE_USER").unwrap_or_else(|_| "postgres".to_string()),
            password,
            database: env::var("DATABASE_NAME").unwrap_or_else(|_| "nexxa_auto".to_string()),
            ssl_mode: env::var("DATABASE_SSL_MODE").unwrap_or_else(|_| "prefer".to_string()),
        }))
    }

    pub fn connection_string(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Parts { host, port, username, password, database, ssl_mode } => format!(
                "postgres://{}:{}@{}:{}/{}?sslmode={}",
                username, password, host, port, database, ssl_mode
            ),
        }
    }
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.connection_string())
        .await
}
