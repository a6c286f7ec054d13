pub mod analyzers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod splitter;
pub mod table;

pub use error::{AnalyzerError, Result};
