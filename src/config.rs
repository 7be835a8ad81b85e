use std::env;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_pass: String,
    pub db_name: String,
    pub db_max_connections: u32,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let db_host = env::var("DB_HOST")
            .unwrap_or_else(|_| "my-mariadb.database.svc.cluster.local".to_string());

        let db_port = env::var("DB_PORT")
            .unwrap_or_else(|_| "3306".to_string())
            .parse::<u16>()
            .context("DB_PORT must be a valid port number (0-65535)")?;

        let db_user = env::var("DB_USER").unwrap_or_else(|_| "apiuser".to_string());

        let db_pass = env::var("DB_PASS").unwrap_or_else(|_| "ApiUserPass123".to_string());

        let db_name = env::var("DB_NAME").unwrap_or_else(|_| "apidb".to_string());

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a positive integer")?;

        if db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be a positive integer");
        }

        let service_port = env::var("SERVICE_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = env::var("SERVICE_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(Config {
            db_host,
            db_port,
            db_user,
            db_pass,
            db_name,
            db_max_connections,
            service_port,
            service_host,
        })
    }

    /// Connection string for the MySQL driver
    pub fn database_url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.db_user, self.db_pass, self.db_host, self.db_port, self.db_name
        )
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Database host: {}:{}", self.db_host, self.db_port);
        tracing::info!("  Database user: {}", self.db_user);
        tracing::info!("  Database name: {}", self.db_name);
        tracing::info!("  Database pool size: {}", self.db_max_connections);
        tracing::info!("  Service listening on: {}:{}", self.service_host, self.service_port);
    }
}
