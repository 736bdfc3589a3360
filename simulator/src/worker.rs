use crate::config::FleetConfig;
use crate::errors::{Error, Result};
use crate::telemetry::{self, SensorIdentity};
use chrono::Utc;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Outstanding requests per client. One publish is in flight per cycle, so
/// the channel never fills.
const REQUEST_CAPACITY: usize = 10;

/// Only every LOG_SAMPLE_EVERY-th sensor logs its publishes, to keep log
/// volume bounded with tens of thousands of workers.
const LOG_SAMPLE_EVERY: usize = 1000;

/// One virtual sensor: owns a single broker connection and publishes
/// telemetry on a fixed interval until it fails or the process stops.
///
/// Lifecycle is connect, then an unbounded publish/sleep loop. There is no
/// reconnect: the first unrecoverable error terminates the worker.
pub struct SensorWorker {
    identity: SensorIdentity,
    client_id: String,
    config: Arc<FleetConfig>,
}

impl SensorWorker {
    pub fn new(identity: SensorIdentity, client_id: String, config: Arc<FleetConfig>) -> Self {
        Self {
            identity,
            client_id,
            config,
        }
    }

    /// Runs the worker to completion and reports its terminal failure. A
    /// dead sensor must not take its siblings or the launcher with it, so
    /// nothing is propagated from here.
    pub async fn run(self) {
        let id = self.identity.id;
        if let Err(e) = self.run_inner().await {
            error!("sensor {} terminated: {}", id, e);
        }
    }

    async fn run_inner(self) -> Result<()> {
        let mut options = MqttOptions::new(
            &self.client_id,
            &self.config.broker_host,
            self.config.broker_port,
        );
        options.set_keep_alive(KEEP_ALIVE);
        options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        await_connack(&mut eventloop).await?;
        debug!("sensor {} connected", self.identity.id);

        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::from_entropy();

        loop {
            let record = telemetry::build_record(&self.identity, &mut rng, Utc::now().naive_utc());
            let payload = serde_json::to_vec(&record)?;

            client
                .publish(&self.config.topic, QoS::AtMostOnce, false, payload)
                .await?;

            if self.identity.id % LOG_SAMPLE_EVERY == 0 {
                info!("sensor {} sent value {}", self.identity.id, record.value);
            }

            idle(&mut eventloop, self.config.interval).await?;
        }
    }
}

/// Drives the event loop until the broker acknowledges the session.
async fn await_connack(eventloop: &mut EventLoop) -> Result<()> {
    loop {
        match eventloop.poll().await? {
            Event::Incoming(Packet::ConnAck(ack)) => {
                if ack.code == ConnectReturnCode::Success {
                    return Ok(());
                }
                return Err(Error::Rejected(ack.code));
            }
            _ => continue,
        }
    }
}

/// Waits out the publish interval while keeping the connection serviced.
/// The event loop owns the socket: queued publishes only reach the wire
/// while it is polled, and transport failures surface here.
async fn idle(eventloop: &mut EventLoop, interval: Duration) -> Result<()> {
    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return Ok(()),
            event = eventloop.poll() => {
                event?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Client aimed at a port nothing listens on, so connects are refused.
    fn unreachable_client() -> (AsyncClient, EventLoop) {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let options = MqttOptions::new("connect-test", "127.0.0.1", port);
        AsyncClient::new(options, REQUEST_CAPACITY)
    }

    #[test]
    fn test_await_connack_surfaces_connection_errors() {
        tokio_test::block_on(async {
            let (_client, mut eventloop) = unreachable_client();

            assert!(matches!(
                await_connack(&mut eventloop).await,
                Err(Error::Connection(_))
            ));
        });
    }

    #[test]
    fn test_idle_surfaces_transport_errors() {
        tokio_test::block_on(async {
            let (_client, mut eventloop) = unreachable_client();

            // The error must cut the wait short; a worker stuck sleeping on a
            // dead connection would never terminate.
            let result = idle(&mut eventloop, Duration::from_secs(30)).await;
            assert!(result.is_err());
        });
    }
}
