pub mod formatters;

pub use formatters::{ConsoleFormatter, JsonFormatter, PlainFormatter, ReplyFormatter};
