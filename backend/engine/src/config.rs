use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Words drawn into a session when the request does not say otherwise.
    pub default_word_count: u32,
    /// Client-facing time limit for the hints game, in seconds.
    pub hints_time_limit_seconds: u32,
    /// Client-facing time limit for every other game type, in seconds.
    pub default_time_limit_seconds: u32,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from a local .env if present
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let default_word_count = settings
            .get_int("game.default_word_count")
            .ok()
            .or_else(|| {
                env::var("GAME_DEFAULT_WORD_COUNT")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .unwrap_or(10) as u32;

        let hints_time_limit_seconds = settings
            .get_int("game.hints_time_limit_seconds")
            .ok()
            .or_else(|| {
                env::var("GAME_HINTS_TIME_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .unwrap_or(300) as u32;

        let default_time_limit_seconds = settings
            .get_int("game.default_time_limit_seconds")
            .ok()
            .or_else(|| {
                env::var("GAME_DEFAULT_TIME_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .unwrap_or(600) as u32;

        Ok(Config {
            default_word_count,
            hints_time_limit_seconds,
            default_time_limit_seconds,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_word_count: 10,
            hints_time_limit_seconds: 300,
            default_time_limit_seconds: 600,
        }
    }
}
