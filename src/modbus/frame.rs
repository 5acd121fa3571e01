//! Request frame construction.
//!
//! Each builder writes a complete frame into a caller-provided buffer sized to
//! the worst case and returns the exact number of bytes used. Fields are
//! encoded at explicit byte offsets; register addresses, quantities and values
//! go big-endian, the trailing CRC low byte first.

use super::crc::crc16_modbus;
use super::protocol::{
    CRC_LEN, FUNC_READ_REGISTERS, FUNC_REPORT_SLAVE_ID, FUNC_WRITE_REGISTER,
    FUNC_WRITE_REGISTERS, REG_READ_QTY_DEFAULT, REG_READ_QTY_MAX, REG_READ_QTY_MIN,
    REG_WRITE_QTY_MAX,
};
use crate::utils::error::ModbusError;

fn ensure_capacity(buf: &[u8], needed: usize) -> Result<(), ModbusError> {
    if buf.len() < needed {
        return Err(ModbusError::InvalidArgument(format!(
            "frame buffer too small: need {} bytes, have {}",
            needed,
            buf.len()
        )));
    }
    Ok(())
}

/// Compute the CRC over `buf[..len]` and append it low byte first.
/// Returns the final frame length. Capacity must already be checked.
fn append_crc(buf: &mut [u8], len: usize) -> usize {
    let crc = crc16_modbus(&buf[..len]);
    buf[len] = (crc & 0x00FF) as u8;
    buf[len + 1] = (crc >> 8) as u8;
    len + CRC_LEN
}

/// Report Slave ID request: header only, then CRC.
pub fn build_report_slave_id(buf: &mut [u8], address: u8) -> Result<usize, ModbusError> {
    ensure_capacity(buf, 2 + CRC_LEN)?;

    buf[0] = address;
    buf[1] = FUNC_REPORT_SLAVE_ID;
    Ok(append_crc(buf, 2))
}

/// Read Holding Registers request.
///
/// A quantity outside [1, 125] is replaced by [`REG_READ_QTY_DEFAULT`] rather
/// than rejected; in-range values pass through unchanged.
pub fn build_read_registers(
    buf: &mut [u8],
    address: u8,
    register: u16,
    quantity: u16,
) -> Result<usize, ModbusError> {
    ensure_capacity(buf, 6 + CRC_LEN)?;

    let quantity = if !(REG_READ_QTY_MIN..=REG_READ_QTY_MAX).contains(&quantity) {
        REG_READ_QTY_DEFAULT
    } else {
        quantity
    };

    buf[0] = address;
    buf[1] = FUNC_READ_REGISTERS;
    buf[2..4].copy_from_slice(&register.to_be_bytes());
    buf[4..6].copy_from_slice(&quantity.to_be_bytes());
    Ok(append_crc(buf, 6))
}

/// Write Single Register request.
pub fn build_write_register(
    buf: &mut [u8],
    address: u8,
    register: u16,
    value: u16,
) -> Result<usize, ModbusError> {
    ensure_capacity(buf, 6 + CRC_LEN)?;

    buf[0] = address;
    buf[1] = FUNC_WRITE_REGISTER;
    buf[2..4].copy_from_slice(&register.to_be_bytes());
    buf[4..6].copy_from_slice(&value.to_be_bytes());
    Ok(append_crc(buf, 6))
}

/// Write Multiple Registers request.
///
/// The supplied value count must equal `quantity` exactly; there is no
/// clamping here. The byte-count field carries `2 * quantity`.
pub fn build_write_registers(
    buf: &mut [u8],
    address: u8,
    register: u16,
    quantity: u16,
    values: &[u16],
) -> Result<usize, ModbusError> {
    if values.len() != quantity as usize {
        return Err(ModbusError::InvalidArgument(format!(
            "register quantity {} does not match {} supplied value(s)",
            quantity,
            values.len()
        )));
    }
    if !(1..=REG_WRITE_QTY_MAX).contains(&quantity) {
        return Err(ModbusError::InvalidArgument(format!(
            "write quantity {} outside 1..={}",
            quantity, REG_WRITE_QTY_MAX
        )));
    }

    let header_len = 7;
    let data_len = 2 * quantity as usize;
    ensure_capacity(buf, header_len + data_len + CRC_LEN)?;

    buf[0] = address;
    buf[1] = FUNC_WRITE_REGISTERS;
    buf[2..4].copy_from_slice(&register.to_be_bytes());
    buf[4..6].copy_from_slice(&quantity.to_be_bytes());
    buf[6] = (2 * quantity) as u8;

    let mut offset = header_len;
    for value in values {
        buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
        offset += 2;
    }
    Ok(append_crc(buf, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_slave_id_layout() {
        let mut buf = [0u8; 16];
        let len = build_report_slave_id(&mut buf, 0x0B).unwrap();
        assert_eq!(len, 4);
        assert_eq!(&buf[..2], &[0x0B, FUNC_REPORT_SLAVE_ID]);

        let crc = crc16_modbus(&buf[..2]);
        assert_eq!(buf[2], (crc & 0xFF) as u8);
        assert_eq!(buf[3], (crc >> 8) as u8);
    }

    #[test]
    fn register_fields_are_big_endian_and_crc_is_not() {
        let mut buf = [0u8; 16];
        build_write_register(&mut buf, 1, 0x1234, 0x1234).unwrap();
        // Register address and value keep network order.
        assert_eq!(&buf[2..4], &[0x12, 0x34]);
        assert_eq!(&buf[4..6], &[0x12, 0x34]);
        // The CRC trailer is the one low-byte-first exception.
        let crc = crc16_modbus(&buf[..6]);
        assert_eq!([buf[6], buf[7]], [(crc & 0xFF) as u8, (crc >> 8) as u8]);
    }

    #[test]
    fn write_register_exact_frame() {
        let mut buf = [0u8; 16];
        let len = build_write_register(&mut buf, 5, 16, 300).unwrap();
        assert_eq!(len, 8);
        assert_eq!(&buf[..6], &[0x05, 0x06, 0x00, 0x10, 0x01, 0x2C]);

        let crc = crc16_modbus(&[0x05, 0x06, 0x00, 0x10, 0x01, 0x2C]);
        assert_eq!(buf[6], (crc & 0xFF) as u8);
        assert_eq!(buf[7], (crc >> 8) as u8);
    }

    #[test]
    fn read_quantity_out_of_range_substitutes_default() {
        let mut low = [0u8; 16];
        let mut high = [0u8; 16];
        build_read_registers(&mut low, 1, 100, 0).unwrap();
        build_read_registers(&mut high, 1, 100, 200).unwrap();

        let default_be = REG_READ_QTY_DEFAULT.to_be_bytes();
        assert_eq!(&low[4..6], &default_be);
        assert_eq!(&high[4..6], &default_be);
    }

    #[test]
    fn read_quantity_in_range_is_preserved() {
        let mut buf = [0u8; 16];
        build_read_registers(&mut buf, 1, 100, 125).unwrap();
        assert_eq!(&buf[4..6], &125u16.to_be_bytes());
    }

    #[test]
    fn write_multiple_rejects_count_mismatch() {
        let mut buf = [0u8; 32];
        let err = build_write_registers(&mut buf, 1, 0, 3, &[0xAAAA, 0xBBBB]).unwrap_err();
        assert!(matches!(err, ModbusError::InvalidArgument(_)));
    }

    #[test]
    fn write_multiple_layout() {
        let mut buf = [0u8; 32];
        let len = build_write_registers(&mut buf, 2, 0x0010, 2, &[0x0102, 0x0304]).unwrap();
        assert_eq!(len, 13);
        assert_eq!(
            &buf[..11],
            &[0x02, 0x10, 0x00, 0x10, 0x00, 0x02, 0x04, 0x01, 0x02, 0x03, 0x04]
        );
        let crc = crc16_modbus(&buf[..11]);
        assert_eq!([buf[11], buf[12]], [(crc & 0xFF) as u8, (crc >> 8) as u8]);
    }

    #[test]
    fn write_multiple_rejects_oversized_quantity() {
        let mut buf = [0u8; 512];
        let values = vec![0u16; 124];
        let err = build_write_registers(&mut buf, 1, 0, 124, &values).unwrap_err();
        assert!(matches!(err, ModbusError::InvalidArgument(_)));
    }

    #[test]
    fn undersized_buffer_is_an_argument_error() {
        let mut buf = [0u8; 3];
        let err = build_read_registers(&mut buf, 1, 0, 1).unwrap_err();
        assert!(matches!(err, ModbusError::InvalidArgument(_)));
    }
}
