use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use config::{Config, ConfigError};
use serde::Deserialize;

use crate::domain::core::{BookingPolicy, BookingWindow};

pub mod domain;
pub mod infrastructure;

#[derive(Clone, Debug, Deserialize)]
pub struct SunProfileConfig {
    pub remote: Remote,
    pub server: Server,
    pub booking: Booking,
    pub logger: Logger,
}

impl SunProfileConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("sunprofile.toml"))
            .add_source(config::Environment::with_prefix("SUNPROFILE").separator("_"))
            .build()?
            .try_deserialize::<SunProfileConfig>()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Remote {
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Server {
    pub bind: String,
}

/// Booking rules consumed by the core. The per-mentor maximum is an explicit
/// parameter, never a constant.
#[derive(Clone, Debug, Deserialize)]
pub struct Booking {
    pub max_per_mentor: usize,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub deadline: DateTime<Utc>,
    #[serde(default = "default_slot_granularity")]
    pub slot_granularity_minutes: u32,
    #[serde(default = "default_lock_wait_secs")]
    pub lock_wait_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Booking {
    pub fn policy(&self) -> BookingPolicy {
        BookingPolicy::new(
            self.max_per_mentor,
            self.deadline,
            BookingWindow::new(self.window_start, self.window_end),
        )
    }

    pub fn lock_wait(&self) -> Duration {
        Duration::from_secs(self.lock_wait_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_slot_granularity() -> u32 {
    30
}

fn default_lock_wait_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Clone, Debug, Deserialize)]
pub struct Logger {
    pub level: Level,
}

#[derive(Clone, Debug, Deserialize)]
pub enum Level {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl From<&Level> for tracing::Level {
    fn from(value: &Level) -> Self {
        match value {
            Level::TRACE => tracing::Level::TRACE,
            Level::DEBUG => tracing::Level::DEBUG,
            Level::INFO => tracing::Level::INFO,
            Level::WARN => tracing::Level::WARN,
            Level::ERROR => tracing::Level::ERROR,
        }
    }
}
