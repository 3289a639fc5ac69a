use crate::sim::BodyId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("unknown body: {0}")]
    UnknownBody(String),

    #[error("{0} does not revolve")]
    NotRevolvable(BodyId),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not resolve project directories")]
    NoProjectDirs,

    #[error("failed to read settings from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings in {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}
