pub mod config;
pub mod directory;
pub mod error;
pub mod feed;
pub mod logging;
pub mod slack;

pub use error::{MoonslaError, Result};
