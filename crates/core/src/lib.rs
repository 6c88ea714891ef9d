pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, TagOptions, load_or_create, load_tag_options, parse_config};
pub use error::{Error, Result};
pub use types::*;
