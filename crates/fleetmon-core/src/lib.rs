// Domain modules
pub mod discovery;
pub mod parse;
pub mod record;
pub mod target;

pub use discovery::parse_targets;
pub use parse::{parse_gpu_table, parse_storage_table, Parsed};
pub use record::{FetchResult, GpuRecord, HostReport, StorageRecord};
pub use target::ServerTarget;
