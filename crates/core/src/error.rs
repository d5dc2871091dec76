use thiserror::Error;

#[derive(Error, Debug)]
pub enum BidboardError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),
}
