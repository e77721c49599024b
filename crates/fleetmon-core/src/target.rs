use std::fmt;

use serde::{Deserialize, Serialize};

/// One remote host to be polled.
///
/// Produced by target discovery before a cycle starts and never mutated
/// afterwards; the same list is walked in order on every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTarget {
    pub host: String,
    pub username: String,
    pub port: u16,
}

impl fmt::Display for ServerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.username, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_user_at_host_port() {
        let target = ServerTarget {
            host: "10.0.0.5".to_string(),
            username: "alice".to_string(),
            port: 22,
        };
        assert_eq!(target.to_string(), "alice@10.0.0.5:22");
    }
}
