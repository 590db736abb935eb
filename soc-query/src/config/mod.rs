//! Configuration for the query tool.

mod settings;

pub use settings::Settings;
