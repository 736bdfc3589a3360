pub mod config;
pub mod errors;
pub mod fleet;
pub mod telemetry;
pub mod worker;
