pub mod config;
pub mod error;

pub use config::{Config, DocstringMarkup};
pub use error::ConfigError;
