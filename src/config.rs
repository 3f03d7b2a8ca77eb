//! Environment-driven configuration

use std::env;
use std::time::Duration;

use crate::models::levels::DEFAULT_TOP_K;
use crate::services::yahoo::DEFAULT_BASE_URL;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Deployment environment name (`APP_ENV`), defaults to `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_port() -> u16 {
    parse_var("PORT").unwrap_or(DEFAULT_PORT)
}

pub fn get_yahoo_base_url() -> String {
    env::var("YAHOO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

pub fn get_http_timeout() -> Duration {
    Duration::from_secs(parse_var("HTTP_TIMEOUT_SECONDS").unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS))
}

/// Default number of ranked prices per side; zero is ignored.
pub fn get_top_k() -> usize {
    parse_var("LEVELS_TOP_K")
        .filter(|k: &usize| *k > 0)
        .unwrap_or(DEFAULT_TOP_K)
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub yahoo_base_url: String,
    pub http_timeout: Duration,
    pub top_k: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            environment: get_environment(),
            port: get_port(),
            yahoo_base_url: get_yahoo_base_url(),
            http_timeout: get_http_timeout(),
            top_k: get_top_k(),
        }
    }

    pub fn is_production(&self) -> bool {
        is_production(&self.environment)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            port: DEFAULT_PORT,
            yahoo_base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
            top_k: DEFAULT_TOP_K,
        }
    }
}

pub fn is_production(environment: &str) -> bool {
    matches!(environment, "production" | "prod")
}
