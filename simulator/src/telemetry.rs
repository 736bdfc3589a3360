use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Range of simulated sensor readings.
pub const VALUE_MIN: f64 = 20.0;
pub const VALUE_MAX: f64 = 100.0;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Device classes the fleet can impersonate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Thermometer,
    Vibration,
    Pressure,
}

impl DeviceClass {
    /// Picks a class uniformly at random.
    pub fn sample(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..3) {
            0 => DeviceClass::Thermometer,
            1 => DeviceClass::Vibration,
            _ => DeviceClass::Pressure,
        }
    }
}

/// Stable identity of one simulated sensor. The device class is assigned
/// once at creation and never changes for the sensor's lifetime.
#[derive(Debug, Clone, Copy)]
pub struct SensorIdentity {
    pub id: usize,
    pub class: DeviceClass,
}

impl SensorIdentity {
    pub fn assign(id: usize, rng: &mut impl Rng) -> Self {
        Self {
            id,
            class: DeviceClass::sample(rng),
        }
    }
}

/// One telemetry reading as it goes over the wire. Field order matches the
/// published JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub sensor_id: String,
    #[serde(rename = "type")]
    pub device_type: DeviceClass,
    pub value: f64,
    pub timestamp: String,
    pub status: String,
}

/// Builds a fresh reading for `identity`. The value is re-drawn on every call
/// from a uniform distribution over [20.0, 100.0] and rounded half away from
/// zero to two decimal places. The timestamp is naive UTC with microsecond
/// precision and no offset suffix.
pub fn build_record(
    identity: &SensorIdentity,
    rng: &mut impl Rng,
    now: NaiveDateTime,
) -> TelemetryRecord {
    let raw: f64 = rng.gen_range(VALUE_MIN..=VALUE_MAX);

    TelemetryRecord {
        sensor_id: format!("sensor_{}", identity.id),
        device_type: identity.class,
        value: (raw * 100.0).round() / 100.0,
        timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
        status: "active".to_string(),
    }
}
