use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModbusError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Communication error: {0}")]
    CommunicationError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Transaction already completed on this connection")]
    TransactionConsumed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for ModbusError {
    fn from(err: std::io::Error) -> Self {
        ModbusError::CommunicationError(format!("IO error: {}", err))
    }
}

impl From<toml::de::Error> for ModbusError {
    fn from(err: toml::de::Error) -> Self {
        ModbusError::ConfigError(format!("TOML error: {}", err))
    }
}

impl From<std::num::ParseIntError> for ModbusError {
    fn from(err: std::num::ParseIntError) -> Self {
        ModbusError::InvalidArgument(format!("not a number: {}", err))
    }
}
