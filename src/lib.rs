pub mod batch;
pub mod error;
pub mod fixup;
pub mod frame;
pub mod html_table;
pub mod http_client;
pub mod persist;
pub mod settings;
pub mod source_config;
pub mod statistics;

pub use error::TableError;
pub use source_config::{SourceConfig, SourceKind};
pub use statistics::Statistics;
