use std::env;

use crate::resolver::DEFAULT_CALORIES_PER_100G;

#[derive(Debug, Clone)]
pub struct Config {
    /// Absent when no store is configured; the service then runs with
    /// search and persistence disabled.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub claude_api_key: String,
    pub claude_model: String,

    /// Calorie value persisted when the estimator returns a missing or
    /// zero-equivalent calorie figure.
    pub fallback_calories_per_100g: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            claude_api_key: env::var("CLAUDE_API_KEY").unwrap_or_else(|_| String::new()),
            claude_model: env::var("CLAUDE_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),

            fallback_calories_per_100g: env::var("FALLBACK_CALORIES_PER_100G")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CALORIES_PER_100G),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
