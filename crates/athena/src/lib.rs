//! Warehouse row source backed by AWS Athena.

pub mod config;
pub mod client;
pub mod result;
pub mod convert;
pub mod source;

pub use config::AthenaConfig;
pub use client::{AthenaClient, AthenaError};
pub use result::{AthenaQueryResult, AthenaColumn, QueryMetadata};
pub use convert::result_to_rows;
pub use source::{RowSource, RowSourceError};
