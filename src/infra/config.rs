//! Centralized configuration (environment variables + defaults).

use crate::app::catalog_service::DashboardSettings;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL (required).
    pub database_url: String,

    /// Maximum database connections in pool (default: 5).
    pub database_max_connections: u32,

    /// Products with fewer units than this are reported as low stock (default: 10).
    pub low_stock_threshold: i32,

    /// Number of newest products shown on the dashboard (default: 5).
    pub recent_products_limit: usize,
}

fn var_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from the environment. Call `dotenv::dotenv()` first to honour `.env`.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        Ok(Self {
            port: var_or("PORT", 3000)?,
            database_url,
            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", 5)?,
            low_stock_threshold: var_or("LOW_STOCK_THRESHOLD", 10)?,
            recent_products_limit: var_or("RECENT_PRODUCTS_LIMIT", 5)?,
        })
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            low_stock_threshold: self.low_stock_threshold,
            recent_limit: self.recent_products_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_or_falls_back_and_parses() {
        assert_eq!(var_or("PRODUCT_CATALOG_TEST_UNSET_VAR", 42u16).unwrap(), 42);

        env::set_var("PRODUCT_CATALOG_TEST_PORT", " 8080 ");
        assert_eq!(var_or("PRODUCT_CATALOG_TEST_PORT", 3000u16).unwrap(), 8080);

        env::set_var("PRODUCT_CATALOG_TEST_BAD", "lots");
        let err = var_or("PRODUCT_CATALOG_TEST_BAD", 10i32).unwrap_err();
        assert!(err.to_string().contains("PRODUCT_CATALOG_TEST_BAD"));
    }

    #[test]
    fn dashboard_settings_follow_config() {
        let config = Config {
            port: 3000,
            database_url: "postgres://localhost/catalog".to_string(),
            database_max_connections: 5,
            low_stock_threshold: 3,
            recent_products_limit: 8,
        };
        assert_eq!(
            config.dashboard_settings(),
            DashboardSettings {
                low_stock_threshold: 3,
                recent_limit: 8,
            }
        );
    }
}
