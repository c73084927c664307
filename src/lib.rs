pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::AppConfig;

pub use crate::adapters::{memory::InMemoryRowSource, sqlite::SqliteRowSource};
pub use crate::core::{classifier::Classifier, service::NumberQuery, service::NumberService};
pub use crate::utils::error::{AppError, ErrorKind, Result};
