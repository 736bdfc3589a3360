use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),

    #[error("connection rejected by broker: {0:?}")]
    Rejected(rumqttc::ConnectReturnCode),

    #[error("publish error: {0}")]
    Publish(#[from] rumqttc::ClientError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
