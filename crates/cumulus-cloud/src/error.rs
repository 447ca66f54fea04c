//! Cloud provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("failed to create instance: {0}")]
    InstanceCreation(String),

    #[error("instance {id} entered terminal state '{state}' while waiting for running")]
    LaunchFailed { id: String, state: String },

    #[error("instance {id} did not reach running state after {attempts} polls")]
    Timeout { id: String, attempts: u32 },

    #[error("DNS record already exists: {alias}")]
    RecordConflict { alias: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CloudError>;
