#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DemoError>;
