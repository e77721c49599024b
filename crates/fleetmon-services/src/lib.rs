pub mod connector;
pub mod fetch;

pub use connector::{
    CommandError, CommandOutput, CommandSession, ConnectError, Connector, SshConnector,
};
pub use fetch::{Fetcher, GPU_COMMAND, NO_GPU_SENTINEL, STORAGE_COMMAND};
