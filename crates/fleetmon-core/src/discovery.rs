//! Target discovery from shell rc text.
//!
//! Fleet hosts are kept as `ssh -P <port> <user>@<host>` aliases in the
//! operator's rc file; every line matching that shape becomes one target.
//! Anything else in the file is ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::target::ServerTarget;

static SSH_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ssh -P (\d+) (\w+)@([\d\.]+)").expect("invalid ssh alias regex"));

/// Extract every ssh alias in `text` as a poll target, in file order.
pub fn parse_targets(text: &str) -> Vec<ServerTarget> {
    SSH_ALIAS
        .captures_iter(text)
        .filter_map(|caps| {
            let port = caps[1].parse::<u16>().ok()?;
            Some(ServerTarget {
                host: caps[3].to_string(),
                username: caps[2].to_string(),
                port,
            })
        })
        .collect()
}
