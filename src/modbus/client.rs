use async_trait::async_trait;
use bytes::BytesMut;
use log::{debug, info};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::protocol::RESPONSE_BUF_SIZE;
use crate::utils::error::ModbusError;

/// The transport seam: one request/reply exchange over an established channel.
#[async_trait]
pub trait ModbusTransport: Send {
    /// Send `frame` and block until the device replies. Returns the raw reply
    /// bytes. Errors are fatal to the transaction; there is no retry.
    async fn transact(&mut self, frame: &[u8]) -> Result<Vec<u8>, ModbusError>;
}

/// Modbus RTU framing carried over a TCP stream.
///
/// The stream is exclusively owned by the single in-flight transaction, and a
/// transport supports exactly one transaction over its lifetime; a second
/// `transact` call fails without touching the wire.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    spent: bool,
}

impl TcpTransport {
    /// Wrap an already-established connection. Setup and teardown of the
    /// stream belong to the caller.
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            spent: false,
        }
    }

    pub async fn connect(host: &str, port: u16) -> Result<Self, ModbusError> {
        info!("🔌 Connecting to {}:{}", host, port);

        let stream = TcpStream::connect((host, port)).await.map_err(|e| {
            ModbusError::ConnectionError(format!("failed to connect to {}:{}: {}", host, port, e))
        })?;

        debug!("✅ Connection established");
        Ok(Self::new(stream))
    }
}

#[async_trait]
impl ModbusTransport for TcpTransport {
    async fn transact(&mut self, frame: &[u8]) -> Result<Vec<u8>, ModbusError> {
        if self.spent {
            return Err(ModbusError::TransactionConsumed);
        }
        self.spent = true;

        info!("📤 Transmitting {} bytes", frame.len());
        info!("📤 Request frame: {}", hex::encode_upper(frame));

        // The frame goes out whole; a send failure aborts the transaction.
        self.stream
            .write_all(frame)
            .await
            .map_err(|e| ModbusError::CommunicationError(format!("send failed: {}", e)))?;

        // One bounded read is the reply: block until at least one byte is
        // available and take whatever arrived. No timeout, no reassembly.
        let mut buf = BytesMut::with_capacity(RESPONSE_BUF_SIZE);
        let n = self
            .stream
            .read_buf(&mut buf)
            .await
            .map_err(|e| ModbusError::CommunicationError(format!("receive failed: {}", e)))?;

        if n == 0 {
            return Err(ModbusError::CommunicationError(
                "connection closed before a reply arrived".to_string(),
            ));
        }

        debug!("📥 Received {} bytes: {}", n, hex::encode_upper(&buf));
        Ok(buf.to_vec())
    }
}
