use chrono::Utc;

use crate::modbus::ReplyFrame;

/// Renders a decoded reply for the primary output stream.
pub trait ReplyFormatter: Send + Sync {
    fn format(&self, reply: &ReplyFrame) -> String;
}

/// Field-by-field breakdown plus all three register views.
pub struct ConsoleFormatter;

impl ReplyFormatter for ConsoleFormatter {
    fn format(&self, reply: &ReplyFrame) -> String {
        let mut output = format!(
            "Device {} response (function 0x{:02X}, {} data bytes)\n",
            reply.device_address, reply.function, reply.byte_count
        );

        output.push_str(&format!(
            "  registers (hex):      {}\n",
            reply.registers_hex().join(" ")
        ));
        output.push_str(&format!(
            "  registers (unsigned): {}\n",
            join_values(reply.registers_unsigned().iter())
        ));
        output.push_str(&format!(
            "  registers (signed):   {}\n",
            join_values(reply.registers_signed().iter())
        ));

        match (reply.received_crc(), reply.crc_ok()) {
            (Some(received), Some(ok)) => {
                output.push_str(&format!(
                    "  crc: computed 0x{:04X}, received 0x{:04X} ({})\n",
                    reply.computed_crc(),
                    received,
                    if ok { "ok" } else { "MISMATCH" }
                ));
            }
            _ => {
                output.push_str(&format!(
                    "  crc: computed 0x{:04X}, none received\n",
                    reply.computed_crc()
                ));
            }
        }

        output
    }
}

/// Machine-readable rendering with a capture timestamp.
pub struct JsonFormatter;

impl ReplyFormatter for JsonFormatter {
    fn format(&self, reply: &ReplyFrame) -> String {
        let json = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "device_address": reply.device_address,
            "function": reply.function,
            "byte_count": reply.byte_count,
            "registers": {
                "hex": reply.registers_hex(),
                "unsigned": reply.registers_unsigned(),
                "signed": reply.registers_signed(),
            },
            "crc": {
                "computed": reply.computed_crc(),
                "received": reply.received_crc(),
                "ok": reply.crc_ok(),
            },
        });

        serde_json::to_string_pretty(&json).unwrap_or_default()
    }
}

/// The signed decimal values, space-separated on a single line.
pub struct PlainFormatter;

impl ReplyFormatter for PlainFormatter {
    fn format(&self, reply: &ReplyFrame) -> String {
        join_values(reply.registers_signed().iter())
    }
}

fn join_values<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
