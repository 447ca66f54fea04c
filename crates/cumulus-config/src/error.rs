use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load config file: {path}\nreason: {message}")]
    Load { path: PathBuf, message: String },

    #[error("could not parse override expression '{expr}': {message}")]
    InvalidOverride { expr: String, message: String },

    #[error("dns: no '{key}' configured (required for record creation)")]
    MissingDnsKey { key: &'static str },

    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
