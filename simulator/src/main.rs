use fleet_simulator::config::FleetConfig;
use fleet_simulator::fleet;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = match FleetConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("--- starting load test: {} sensors ---", config.fleet_size);
    info!("target: {}:{}", config.broker_host, config.broker_port);
    info!(
        "topic: {}, interval: {:?}, ramp-up batch: {}",
        config.topic, config.interval, config.batch_size
    );

    tokio::select! {
        _ = fleet::launch(Arc::clone(&config)) => {
            info!("all sensors terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("test stopped by user");
        }
    }
}
