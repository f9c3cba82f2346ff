use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("unknown model key: {0}")]
    UnknownModel(String),

    #[error("snapshot store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
