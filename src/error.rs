use thiserror::Error;

#[derive(Error, Debug)]
pub enum RutestError {
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("非法状态迁移: {0}")]
    StateError(String),

    #[error("发现阶段错误: {0}")]
    DiscoveryError(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for RutestError {
    fn from(err: anyhow::Error) -> Self {
        RutestError::Other(err.to_string())
    }
}

// Add conversion from config::ConfigError
impl From<crate::config::ConfigError> for RutestError {
    fn from(err: crate::config::ConfigError) -> Self {
        RutestError::ConfigError(err.to_string())
    }
}

// Add conversion from registry::DescriptorError
impl From<crate::registry::DescriptorError> for RutestError {
    fn from(err: crate::registry::DescriptorError) -> Self {
        RutestError::DiscoveryError(err.to_string())
    }
}

/// Result type for rutest crate
pub type Result<T> = std::result::Result<T, RutestError>;
