use std::{env, fmt::Display, net::SocketAddr, str::FromStr, time::Duration};

use crate::{
    error::Error,
    sources::{default_registry, load_registry, Source},
};

/// Runtime settings, read from environment variables.
///
/// | Variable             | Default          |
/// |----------------------|------------------|
/// | `HOST`               | `127.0.0.1`      |
/// | `PORT`               | `3000`           |
/// | `SOURCES`            | built-in serveries (path to a JSON registry) |
/// | `FETCH_TIMEOUT_SECS` | `15`             |
/// | `SCRAPE_TIMEOUT_SECS`| `45`             |
/// | `REFRESH_MINUTES`    | `15`             |
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub sources: Vec<Source>,
    /// Bound on each individual request.
    pub fetch_timeout: Duration,
    /// Bound on a whole scrape; sources still pending then are dropped.
    pub scrape_timeout: Duration,
    pub refresh_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            sources: default_registry(),
            fetch_timeout: Duration::from_secs(15),
            scrape_timeout: Duration::from_secs(45),
            refresh_interval: Duration::from_secs(15 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let defaults = Self::default();
        let sources = match lookup("SOURCES") {
            Some(path) => load_registry(path)?,
            None => {
                log::info!("SOURCES not set, using the built-in serveries.");
                defaults.sources
            }
        };
        let fetch_secs = parse_var(&lookup, "FETCH_TIMEOUT_SECS", defaults.fetch_timeout.as_secs())?;
        let scrape_secs = parse_var(&lookup, "SCRAPE_TIMEOUT_SECS", defaults.scrape_timeout.as_secs())?;
        let refresh_mins = parse_var(&lookup, "REFRESH_MINUTES", defaults.refresh_interval.as_secs() / 60)?;
        if refresh_mins == 0 {
            return Err(Error::config_error("REFRESH_MINUTES must be at least 1"));
        }
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            sources,
            fetch_timeout: Duration::from_secs(fetch_secs),
            scrape_timeout: Duration::from_secs(scrape_secs),
            refresh_interval: Duration::from_secs(refresh_mins * 60),
        })
    }

    pub fn addr(&self) -> crate::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr).map_err(|e| Error::config_error(format!("{addr}: {e}")))
    }
}

fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> crate::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| Error::config_error(format!("{key}={raw:?}: {e}")))
    })
}
