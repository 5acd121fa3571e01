pub mod settings;

pub use settings::{ConnectionSettings, OutputFormat, OutputSettings, Settings};
