use std::{env, net::SocketAddr};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Size of each of the two connection pools (sqlx and SeaORM).
    pub db_max_connections: u32,
    pub body_limit_bytes: usize,
    pub max_in_flight_requests: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unparsable optional
    /// values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let parsed = |key: &str| lookup(key).and_then(|v| v.parse::<u64>().ok());

        Ok(Self {
            database_url,
            host,
            port: lookup("APP_PORT")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(3000),
            db_max_connections: parsed("DB_MAX_CONNECTIONS").map_or(10, |v| v as u32),
            body_limit_bytes: parsed("APP_BODY_LIMIT_BYTES").map_or(1024 * 1024, |v| v as usize),
            max_in_flight_requests: parsed("APP_MAX_IN_FLIGHT").map_or(100, |v| v as usize),
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: std::net::IpAddr = self
            .host
            .parse()
            .with_context(|| format!("APP_HOST `{}` is not an IP address", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn database_url_is_required() {
        assert!(config(&[]).is_err());
    }

    #[test]
    fn defaults_apply_when_unset_or_garbage() {
        let cfg = config(&[("DATABASE_URL", "postgres://db"), ("APP_PORT", "http")]).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.body_limit_bytes, 1024 * 1024);
        assert_eq!(cfg.max_in_flight_requests, 100);
        assert_eq!(cfg.bind_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn overrides_are_read() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://db"),
            ("APP_HOST", "0.0.0.0"),
            ("APP_PORT", "8080"),
            ("DB_MAX_CONNECTIONS", "4"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.db_max_connections, 4);
    }

    #[test]
    fn hostnames_are_rejected() {
        let cfg = config(&[("DATABASE_URL", "postgres://db"), ("APP_HOST", "localhost")]).unwrap();
        assert!(cfg.bind_addr().is_err());
    }
}
