use crate::errors::{Error, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Process-wide fleet settings, read once at startup and immutable
/// afterwards. All values are environment-overridable with defaults.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub topic: String,
    pub fleet_size: usize,
    pub interval: Duration,
    pub batch_size: usize,
}

impl FleetConfig {
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| env::var(key).ok())
    }

    fn resolve(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let broker_host = get("MQTT_BROKER").unwrap_or_else(|| "localhost".to_string());
        let broker_port: u16 = parse_or(get("MQTT_PORT"), 1883, "MQTT_PORT")?;
        let topic = get("MQTT_TOPIC").unwrap_or_else(|| "sensors/telemetry".to_string());
        let fleet_size: usize = parse_or(get("NUM_SENSORS"), 10000, "NUM_SENSORS")?;
        let interval_seconds: f64 = parse_or(get("INTERVAL_SECONDS"), 5.0, "INTERVAL_SECONDS")?;
        let batch_size: usize = parse_or(get("BATCH_SIZE"), 500, "BATCH_SIZE")?;

        let interval = Duration::try_from_secs_f64(interval_seconds)
            .map_err(|e| Error::Config(format!("INTERVAL_SECONDS: {}", e)))?;

        if batch_size == 0 {
            return Err(Error::Config("BATCH_SIZE must be at least 1".to_string()));
        }

        Ok(Self {
            broker_host,
            broker_port,
            topic,
            fleet_size,
            interval,
            batch_size,
        })
    }
}

fn parse_or<T>(raw: Option<String>, default: T, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(value) => value
            .parse()
            .map_err(|e| Error::Config(format!("{}: invalid value {:?}: {}", key, value, e))),
        None => Ok(default),
    }
}
