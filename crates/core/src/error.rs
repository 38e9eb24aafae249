use thiserror::Error;

/// Errors surfaced by loading, filtering and writing point clouds.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed point cloud data: {0}")]
    Format(String),

    #[error("insufficient data: need at least {required} points, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl CloudError {
    pub fn format(msg: impl Into<String>) -> Self {
        CloudError::Format(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        CloudError::InvalidParameter(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
