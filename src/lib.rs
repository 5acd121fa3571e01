//! Power Monitor Modbus Client
//!
//! This library builds, transmits and decodes Modbus RTU frames carried over
//! TCP for querying, reading and writing the registers of a power-monitor
//! field device. One invocation performs exactly one request/reply
//! transaction.

pub mod cli;
pub mod config;
pub mod modbus;
pub mod output;
pub mod utils;

// Re-export commonly used types
pub use config::{OutputFormat, Settings};
pub use modbus::{crc16_modbus, ModbusRequest, ModbusTransport, ReplyFrame, TcpTransport};
pub use output::{ConsoleFormatter, JsonFormatter, PlainFormatter, ReplyFormatter};
pub use utils::error::ModbusError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
