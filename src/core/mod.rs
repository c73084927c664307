pub mod classifier;
pub mod params;
pub mod rescan;
pub mod service;

pub use crate::domain::model::{Classification, PageMeta, PageRequest, PageResult, PhoneRecord, State};
pub use crate::domain::ports::{NumberClassifier, RowSource};
pub use crate::utils::error::Result;
