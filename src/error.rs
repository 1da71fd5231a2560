//! Error types for the sync pipeline.

/// Run-level errors. Per-category fetch trouble never surfaces here; the run
/// loop recovers it locally and records it in the run report.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),
    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sqlite error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
