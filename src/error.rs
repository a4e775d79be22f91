use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] terrachrone_core::Error),
    #[error("Failed to read run file '{path}': {source}")]
    RunFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid run file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Run file has no [{0}] section")]
    MissingSection(&'static str),
    #[error("Invalid origin '{0}': {1}")]
    Origin(String, String),
    #[error("Could not start worker threads: {0}")]
    Threads(#[from] rayon::ThreadPoolBuildError),
    #[error("Logging setup failed: {0}")]
    Logging(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0} budget(s) failed, see the log")]
    PartialRun(usize),
}
