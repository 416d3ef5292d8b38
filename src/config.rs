//! Runtime configuration, read from the environment.

use crate::error::ConfigError;
use log::LevelFilter;
use std::{env, path::PathBuf, str::FromStr};

pub const DEFAULT_CLINIC_NAME: &str = "UBC Student Hospital";
pub const DEFAULT_SLOTS: usize = 9;
pub const DEFAULT_OPENING_HOUR: u32 = 8;
pub const DEFAULT_STORE: &str = "./data/appointments.json";

const HOURS_PER_DAY: u32 = 24;

/// Shape of the clinic day as seen by the allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocatorConfig {
    /// Number of one-hour slots in the day.
    pub capacity: usize,
    /// Hour the first slot starts at.
    pub base_hour: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        AllocatorConfig {
            capacity: DEFAULT_SLOTS,
            base_hour: DEFAULT_OPENING_HOUR,
        }
    }
}

impl AllocatorConfig {
    pub fn new(capacity: usize, base_hour: u32) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::NoSlots);
        }
        if base_hour >= HOURS_PER_DAY {
            return Err(ConfigError::OpeningHour { hour: base_hour });
        }
        if base_hour as usize + capacity > HOURS_PER_DAY as usize {
            return Err(ConfigError::PastMidnight {
                base_hour,
                capacity,
            });
        }
        Ok(AllocatorConfig {
            capacity,
            base_hour,
        })
    }

    /// Hour the last slot ends at.
    pub fn closing_hour(&self) -> u32 {
        self.base_hour + self.capacity as u32
    }
}

/// Configuration for the console front-end.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub clinic_name: String,
    pub allocator: AllocatorConfig,
    pub store_path: PathBuf,
    pub log_level: LevelFilter,
}

impl AppConfig {
    /// Load from `CLINIC_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let clinic_name = lookup("CLINIC_NAME")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CLINIC_NAME.to_string());
        let capacity = parse_var(&lookup, "CLINIC_SLOTS", DEFAULT_SLOTS)?;
        let base_hour = parse_var(&lookup, "CLINIC_OPENING_HOUR", DEFAULT_OPENING_HOUR)?;
        let store_path = lookup("CLINIC_STORE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
        let log_level = parse_var(&lookup, "CLINIC_LOG", LevelFilter::Warn)?;

        Ok(AppConfig {
            clinic_name,
            allocator: AllocatorConfig::new(capacity, base_hour)?,
            store_path,
            log_level,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw.clone(),
        }),
    }
}
