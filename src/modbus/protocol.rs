//! Protocol constants and the request model.
//!
//! Function codes are opaque byte constants from the fixed Modbus registry;
//! nothing here reinterprets them. Register fields travel big-endian, the
//! trailing CRC low byte first.

use super::frame;
use crate::utils::error::ModbusError;

/// Report Slave ID.
pub const FUNC_REPORT_SLAVE_ID: u8 = 0x11;
/// Read Holding Registers.
pub const FUNC_READ_REGISTERS: u8 = 0x03;
/// Write Single Register.
pub const FUNC_WRITE_REGISTER: u8 = 0x06;
/// Write Multiple Registers.
pub const FUNC_WRITE_REGISTERS: u8 = 0x10;

pub const REG_READ_QTY_MIN: u16 = 1;
pub const REG_READ_QTY_MAX: u16 = 125;
/// Substituted when a caller-supplied read quantity falls outside
/// [`REG_READ_QTY_MIN`, `REG_READ_QTY_MAX`]. Substitution is policy, not an
/// error; 1 is the only quantity valid on every device.
pub const REG_READ_QTY_DEFAULT: u16 = 1;

/// Ceiling for Write Multiple Registers: 1 + 1 + 2 + 2 + 1 + 2n + 2 <= 256
/// keeps the byte-count field inside a u8 and the frame inside the RTU ADU.
pub const REG_WRITE_QTY_MAX: u16 = 123;

pub const CRC_LEN: usize = 2;

/// Worst-case request frame: the 256-byte RTU ADU.
pub const REQUEST_BUF_SIZE: usize = 256;
/// Receive buffer for a single reply read.
pub const RESPONSE_BUF_SIZE: usize = 1024;

/// One of the four operations a transaction can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModbusRequest {
    ReportSlaveId {
        address: u8,
    },
    ReadRegisters {
        address: u8,
        register: u16,
        quantity: u16,
    },
    WriteRegister {
        address: u8,
        register: u16,
        value: u16,
    },
    WriteRegisters {
        address: u8,
        register: u16,
        quantity: u16,
        values: Vec<u16>,
    },
}

impl ModbusRequest {
    pub fn function(&self) -> u8 {
        match self {
            ModbusRequest::ReportSlaveId { .. } => FUNC_REPORT_SLAVE_ID,
            ModbusRequest::ReadRegisters { .. } => FUNC_READ_REGISTERS,
            ModbusRequest::WriteRegister { .. } => FUNC_WRITE_REGISTER,
            ModbusRequest::WriteRegisters { .. } => FUNC_WRITE_REGISTERS,
        }
    }

    pub fn device_address(&self) -> u8 {
        match *self {
            ModbusRequest::ReportSlaveId { address } => address,
            ModbusRequest::ReadRegisters { address, .. } => address,
            ModbusRequest::WriteRegister { address, .. } => address,
            ModbusRequest::WriteRegisters { address, .. } => address,
        }
    }

    /// Encode this request into `buf`, returning the exact frame length.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, ModbusError> {
        match self {
            ModbusRequest::ReportSlaveId { address } => {
                frame::build_report_slave_id(buf, *address)
            }
            ModbusRequest::ReadRegisters {
                address,
                register,
                quantity,
            } => frame::build_read_registers(buf, *address, *register, *quantity),
            ModbusRequest::WriteRegister {
                address,
                register,
                value,
            } => frame::build_write_register(buf, *address, *register, *value),
            ModbusRequest::WriteRegisters {
                address,
                register,
                quantity,
                values,
            } => frame::build_write_registers(buf, *address, *register, *quantity, values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_its_function_code() {
        let req = ModbusRequest::ReadRegisters {
            address: 2,
            register: 100,
            quantity: 4,
        };
        assert_eq!(req.function(), FUNC_READ_REGISTERS);
        assert_eq!(req.device_address(), 2);
    }

    #[test]
    fn encode_dispatches_to_builder() {
        let req = ModbusRequest::ReportSlaveId { address: 9 };
        let mut buf = [0u8; REQUEST_BUF_SIZE];
        let len = req.encode(&mut buf).unwrap();
        assert_eq!(len, 4);
        assert_eq!(buf[0], 9);
        assert_eq!(buf[1], FUNC_REPORT_SLAVE_ID);
    }
}
