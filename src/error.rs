use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaboonError {
    #[error("无效难度: {0}")]
    InvalidDifficulty(String),

    #[error("无效区块: {0}")]
    InvalidBlock(String),

    #[error("无效区块链: {0}")]
    InvalidChain(String),

    #[error("哈希错误: {0}")]
    HashError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("IO错误: {0}")]
    IOError(String),
}

impl From<std::io::Error> for LaboonError {
    fn from(err: std::io::Error) -> Self {
        LaboonError::IOError(err.to_string())
    }
}

impl From<toml::de::Error> for LaboonError {
    fn from(err: toml::de::Error) -> Self {
        LaboonError::ConfigError(err.to_string())
    }
}

impl From<hex::FromHexError> for LaboonError {
    fn from(err: hex::FromHexError) -> Self {
        LaboonError::HashError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LaboonError>;
