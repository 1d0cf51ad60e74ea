//! Error types for prop controllers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PropControllerError {
    #[error("Invalid prop controller descriptor: {0}")]
    InvalidDescriptor(#[source] serde_json::Error),

    #[error("Invalid link value: {0}")]
    InvalidLink(#[source] serde_json::Error),

    #[error("Invalid prop controller message: {0}")]
    InvalidMessage(#[source] serde_json::Error),
}

pub type PropControllerResult<T> = Result<T, PropControllerError>;
