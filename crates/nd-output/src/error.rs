use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("encode error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("not a replay file (bad magic)")]
    BadMagic,

    #[error("unsupported replay file version {0}")]
    UnsupportedVersion(u16),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type OutputResult<T> = Result<T, OutputError>;
