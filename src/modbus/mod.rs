pub mod client;
pub mod crc;
pub mod frame;
pub mod protocol;
pub mod response;

pub use client::{ModbusTransport, TcpTransport};
pub use crc::crc16_modbus;
pub use protocol::ModbusRequest;
pub use response::ReplyFrame;
