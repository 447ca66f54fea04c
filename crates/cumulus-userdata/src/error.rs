use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserDataError {
    #[error("failed to load user data template: {path}\nreason: {message}")]
    TemplateLoad { path: PathBuf, message: String },

    #[error("failed to render user data template: {path}\nreason: {message}")]
    TemplateRender { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, UserDataError>;
