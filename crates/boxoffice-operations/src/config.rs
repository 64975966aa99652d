use std::collections::HashSet;
use std::path::Path;

use boxoffice_core::{Event, Money};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{OperationError, Result};
use crate::fault::FaultPolicy;

const DEFAULT_PAYMENT_LIMIT: Money = Money::from_major(1000);

/// Settings for a boxoffice run, usually read from `boxoffice.toml`.
///
/// Every section is optional. A missing `events` list falls back to
/// [`sample_events`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoxofficeConfig {
    pub payment: PaymentConfig,
    pub ticketing: ServiceConfig,
    pub email: ServiceConfig,
    /// Event ids must be unique.
    #[serde(deserialize_with = "unique_events")]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaymentConfig {
    /// Largest amount a single payment may charge.
    pub limit: Money,
    pub fault: FaultPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub fault: FaultPolicy,
}

impl Default for BoxofficeConfig {
    fn default() -> Self {
        Self {
            payment: PaymentConfig::default(),
            ticketing: ServiceConfig::default(),
            email: ServiceConfig::default(),
            events: sample_events(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAYMENT_LIMIT,
            fault: FaultPolicy::Never,
        }
    }
}

impl BoxofficeConfig {
    /// Read and parse a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigRead` if the file cannot be read and `ConfigParse` if it
    /// is not a valid config.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| OperationError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::parse(&contents).map_err(|source| OperationError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            events = config.events.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is malformed or has unknown keys.
    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

fn unique_events<'de, D>(deserializer: D) -> std::result::Result<Vec<Event>, D::Error>
where
    D: Deserializer<'de>,
{
    let events = Vec::<Event>::deserialize(deserializer)?;
    let mut seen = HashSet::new();
    if let Some(duplicate) = events.iter().find(|e| !seen.insert(e.id.as_str())) {
        return Err(serde::de::Error::custom(format!(
            "duplicate event id '{}'",
            duplicate.id
        )));
    }
    Ok(events)
}

/// The two events available when no config lists any.
#[must_use]
pub fn sample_events() -> Vec<Event> {
    vec![
        Event::new(
            "event-001",
            "Rock Concert",
            Utc.with_ymd_and_hms(2025, 6, 15, 20, 0, 0)
                .single()
                .unwrap_or_default(),
            Money::from_major(150),
            100,
        ),
        Event::new(
            "event-002",
            "Go Workshop",
            Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0)
                .single()
                .unwrap_or_default(),
            Money::from_major(80),
            50,
        ),
    ]
}
