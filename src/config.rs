//! Runtime configuration for the terminal quiz.
//!
//! Command-line values win over the environment. A `.env` file in the working
//! directory is loaded first and never overrides variables already set.
//!
//! * `CALLM_DEBOUNCE_MS`: delay before auto-advancing, in milliseconds.
//! * `CALLM_ANSWERS`: file used to resume from and save answers to.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::engine::DEFAULT_DEBOUNCE;

pub const DEBOUNCE_ENV: &str = "CALLM_DEBOUNCE_MS";
pub const ANSWERS_ENV: &str = "CALLM_ANSWERS";

/// Longest accepted debounce.
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(10);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CALLM_DEBOUNCE_MS must be a whole number of milliseconds, got '{0}'")]
    InvalidDebounce(String),

    #[error("debounce of {0} ms exceeds the {max} ms limit", max = MAX_DEBOUNCE.as_millis())]
    DebounceTooLong(u64),

    #[error("questions file {} does not exist", .0.display())]
    MissingQuestions(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub questions_path: PathBuf,
    pub answers_path: Option<PathBuf>,
    pub debounce: Duration,
}

impl Config {
    /// Builds the configuration from command-line values over the process
    /// environment.
    pub fn from_env(
        questions_path: PathBuf,
        answers_path: Option<PathBuf>,
        debounce_ms: Option<u64>,
    ) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::resolve(questions_path, answers_path, debounce_ms, |key| {
            env::var(key).ok()
        })
    }

    fn resolve(
        questions_path: PathBuf,
        answers_path: Option<PathBuf>,
        debounce_ms: Option<u64>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if !questions_path.exists() {
            return Err(ConfigError::MissingQuestions(questions_path));
        }

        let answers_path = answers_path.or_else(|| lookup(ANSWERS_ENV).map(PathBuf::from));

        let debounce_ms = match debounce_ms {
            Some(ms) => Some(ms),
            None => lookup(DEBOUNCE_ENV)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidDebounce(raw))
                })
                .transpose()?,
        };
        let debounce = match debounce_ms {
            Some(ms) if Duration::from_millis(ms) > MAX_DEBOUNCE => {
                return Err(ConfigError::DebounceTooLong(ms));
            }
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_DEBOUNCE,
        };

        let config = Self {
            questions_path,
            answers_path,
            debounce,
        };
        debug!(?config, "resolved configuration");
        Ok(config)
    }
}
