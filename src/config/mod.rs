//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Database URL (SQLite path, with or without the sqlite:// prefix)
    pub database_url: String,

    /// JWT secret for token signing and verification
    pub jwt_secret: String,

    /// Bcrypt cost factor for password hashing
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .or_else(|_| env::var("DATABASE_PATH"))
            .unwrap_or_else(|_| "./data/bookshelf.db".to_string());

        // JWT_SECRET is always required - generate a random one if not provided in dev
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            // In production, this should be set explicitly
            use std::collections::hash_map::DefaultHasher;
            use std::hash::{Hash, Hasher};
            let mut hasher = DefaultHasher::new();
            std::time::SystemTime::now().hash(&mut hasher);
            format!("dev-secret-{}", hasher.finish())
        });

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            jwt_secret,

            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Only verify the parse-independent defaults; env vars may leak from
        // the host, so set nothing and check fallbacks hold when unset.
        if env::var("PORT").is_err() {
            let config = Config::from_env().unwrap();
            assert_eq!(config.port, 4000);
            assert!(config.bcrypt_cost >= 10);
        }
    }
}
