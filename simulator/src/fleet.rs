use crate::config::FleetConfig;
use crate::telemetry::SensorIdentity;
use crate::worker::SensorWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

/// Pause between ramp-up batches, amortizing the cost of opening thousands
/// of connections near-simultaneously.
const RAMP_PAUSE: Duration = Duration::from_millis(500);

/// True when worker creation should pause for ramp-up after spawning
/// `index`. Index 0 trips the modulus too, so a fresh fleet pauses once
/// before the first full batch is up; kept for compatibility with earlier
/// deployments.
fn ramp_pause_due(index: usize, batch_size: usize) -> bool {
    index % batch_size == 0
}

/// Brings up the whole fleet in paced batches, then waits for it.
///
/// Each sensor gets its identity here and runs as an independent task; a
/// worker failure terminates that task alone. Since healthy workers publish
/// forever, this returns only once every worker has terminated.
pub async fn launch(config: Arc<FleetConfig>) {
    let run_id = Uuid::new_v4().simple();
    let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::from_entropy();
    let mut fleet: Vec<JoinHandle<()>> = Vec::with_capacity(config.fleet_size);

    for id in 0..config.fleet_size {
        let identity = SensorIdentity::assign(id, &mut rng);
        let client_id = format!("sensor-{}-{}", id, run_id);
        let worker = SensorWorker::new(identity, client_id, Arc::clone(&config));

        fleet.push(tokio::spawn(worker.run()));

        if ramp_pause_due(id, config.batch_size) {
            tokio::time::sleep(RAMP_PAUSE).await;
            info!("{} sensors initialized", id);
        }
    }

    for handle in fleet {
        let _ = handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_pause_includes_index_zero() {
        assert!(ramp_pause_due(0, 500));
        assert!(!ramp_pause_due(1, 500));
        assert!(!ramp_pause_due(499, 500));
        assert!(ramp_pause_due(500, 500));
        assert!(ramp_pause_due(1000, 500));
    }

    #[test]
    fn test_ramp_pause_count_matches_divisible_indices() {
        let n = 10;
        let batch = 3;

        let pauses = (0..n).filter(|i| ramp_pause_due(*i, batch)).count();
        // indices 0, 3, 6, 9
        assert_eq!(pauses, 4);
    }

    #[test]
    fn test_batch_of_one_pauses_every_index() {
        let pauses = (0..5).filter(|i| ramp_pause_due(*i, 1)).count();
        assert_eq!(pauses, 5);
    }
}
