use thiserror::Error;

/// Common error type shared by the livecanvas crates
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
