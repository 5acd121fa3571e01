use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

use crate::config::{OutputFormat, Settings};
use crate::modbus::client::{ModbusTransport, TcpTransport};
use crate::modbus::protocol::{ModbusRequest, REQUEST_BUF_SIZE};
use crate::modbus::response::ReplyFrame;
use crate::output::{ConsoleFormatter, JsonFormatter, PlainFormatter, ReplyFormatter};
use crate::utils::error::ModbusError;

#[derive(Parser, Debug)]
#[command(
    name = "powermon",
    version,
    about = "Query, read and write power monitor registers over Modbus RTU on TCP"
)]
pub struct Cli {
    /// Settings file supplying connection defaults
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Meter host name or IP address
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Meter TCP port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Device address on the bus
    #[arg(short, long)]
    pub device: Option<u8>,

    /// Output format: console, json or plain
    #[arg(short, long)]
    pub format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Query the device identification
    #[command(visible_alias = "q")]
    Query,

    /// Read one or more holding registers
    #[command(visible_alias = "r")]
    Read {
        register: u16,
        /// Quantity of registers; an out-of-range value falls back to the
        /// protocol default instead of failing
        quantity: Option<u16>,
    },

    /// Write a single register
    #[command(visible_alias = "w")]
    Write { register: u16, value: u16 },

    /// Write multiple consecutive registers
    #[command(visible_alias = "m")]
    Writem {
        register: u16,
        /// Declared register count; must match the number of values exactly
        quantity: u16,
        #[arg(required = true)]
        values: Vec<u16>,
    },
}

/// Execute one complete transaction for the parsed command line.
pub async fn run(cli: Cli) -> Result<(), ModbusError> {
    let settings = Settings::load_or_default(cli.config.as_deref());

    let host = cli.host.or(settings.connection.host).ok_or_else(|| {
        ModbusError::InvalidArgument("no host given (use --host or a settings file)".to_string())
    })?;
    let port = cli.port.or(settings.connection.port).ok_or_else(|| {
        ModbusError::InvalidArgument("no port given (use --port or a settings file)".to_string())
    })?;
    let device = cli
        .device
        .or(settings.connection.device_address)
        .ok_or_else(|| {
            ModbusError::InvalidArgument(
                "no device address given (use --device or a settings file)".to_string(),
            )
        })?;

    let format = match &cli.format {
        Some(name) => name.parse()?,
        None => settings.output.format,
    };

    // Argument errors surface here, before any connection is attempted.
    let request = build_request(&cli.command, device);
    let mut buf = [0u8; REQUEST_BUF_SIZE];
    let len = request.encode(&mut buf)?;

    let mut transport = TcpTransport::connect(&host, port).await?;
    let raw = transport.transact(&buf[..len]).await?;

    let reply = ReplyFrame::decode(&raw)?;
    log_reply(&reply);

    let formatter = formatter_for(format);
    println!("{}", formatter.format(&reply));
    Ok(())
}

fn build_request(command: &Command, device: u8) -> ModbusRequest {
    match command {
        Command::Query => ModbusRequest::ReportSlaveId { address: device },
        Command::Read { register, quantity } => ModbusRequest::ReadRegisters {
            address: device,
            register: *register,
            // A missing quantity takes the same substitution path as an
            // out-of-range one.
            quantity: quantity.unwrap_or(0),
        },
        Command::Write { register, value } => ModbusRequest::WriteRegister {
            address: device,
            register: *register,
            value: *value,
        },
        Command::Writem {
            register,
            quantity,
            values,
        } => ModbusRequest::WriteRegisters {
            address: device,
            register: *register,
            quantity: *quantity,
            values: values.clone(),
        },
    }
}

fn log_reply(reply: &ReplyFrame) {
    info!("📥 Response received:");
    info!("  device address: {}", reply.device_address);
    info!("  function: 0x{:02X}", reply.function);
    info!("  byte count: {}", reply.byte_count);
    info!("  computed crc: 0x{:04X}", reply.computed_crc());

    // A mismatch is reported, never escalated; strict callers act on it.
    if reply.crc_ok() == Some(false) {
        warn!(
            "❌ CRC mismatch: computed 0x{:04X}, received 0x{:04X}",
            reply.computed_crc(),
            reply.received_crc().unwrap_or(0)
        );
    }
}

fn formatter_for(format: OutputFormat) -> Box<dyn ReplyFormatter> {
    match format {
        OutputFormat::Console => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Plain => Box::new(PlainFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builds_report_slave_id() {
        let req = build_request(&Command::Query, 7);
        assert_eq!(req, ModbusRequest::ReportSlaveId { address: 7 });
    }

    #[test]
    fn omitted_read_quantity_takes_substitution_path() {
        let req = build_request(
            &Command::Read {
                register: 244,
                quantity: None,
            },
            2,
        );
        let mut buf = [0u8; REQUEST_BUF_SIZE];
        req.encode(&mut buf).unwrap();
        assert_eq!(
            &buf[4..6],
            &crate::modbus::protocol::REG_READ_QTY_DEFAULT.to_be_bytes()
        );
    }

    #[test]
    fn cli_parses_aliases() {
        let cli = Cli::try_parse_from([
            "powermon", "-H", "10.0.0.30", "-p", "4660", "-d", "5", "r", "16", "2",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Read {
                register: 16,
                quantity: Some(2)
            }
        ));

        let cli = Cli::try_parse_from([
            "powermon", "-H", "10.0.0.30", "-p", "4660", "-d", "5", "m", "16", "2", "1", "2",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Writem { quantity: 2, .. }));
    }

    #[test]
    fn writem_requires_at_least_one_value() {
        let result =
            Cli::try_parse_from(["powermon", "-H", "h", "-p", "1", "-d", "1", "m", "16", "1"]);
        assert!(result.is_err());
    }
}
