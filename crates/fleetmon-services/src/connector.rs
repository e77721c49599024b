//! SSH session establishment and remote command execution.
//!
//! The `Connector` / `CommandSession` traits are the seam between the
//! orchestrator and the network: production code goes through `ssh2`,
//! tests substitute scripted sessions.

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use fleetmon_core::ServerTarget;

/// Session establishment failure. Network unreachable, authentication
/// rejected and protocol negotiation failures all land here; callers do
/// not distinguish them.
#[derive(Debug, Error)]
#[error("connection to {target} failed: {detail}")]
pub struct ConnectError {
    pub target: String,
    pub detail: String,
}

/// Transport-level failure while running one command.
#[derive(Debug, Error)]
#[error("command `{command}` failed: {detail}")]
pub struct CommandError {
    pub command: String,
    pub detail: String,
}

/// Decoded output of one remote command. `ok` is exit status zero.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub ok: bool,
}

/// An authenticated remote shell scoped to one polling attempt.
pub trait CommandSession {
    /// Execute `command` verbatim and wait for it to finish.
    fn run(&mut self, command: &str) -> Result<CommandOutput, CommandError>;

    /// Best-effort teardown. Never fails the poll.
    fn close(&mut self);
}

/// Opens one session per target with a shared password.
pub trait Connector {
    type Session: CommandSession;

    fn connect(&self, target: &ServerTarget, secret: &str)
        -> Result<Self::Session, ConnectError>;
}

/// Production connector over libssh2.
///
/// Trust-on-first-use: host keys are not verified. `timeout` bounds the TCP
/// connect and all subsequent blocking session I/O, so an unreachable or
/// wedged host cannot stall the cycle indefinitely.
#[derive(Debug, Clone)]
pub struct SshConnector {
    timeout: Duration,
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

impl SshConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Connector for SshConnector {
    type Session = SshSession;

    fn connect(&self, target: &ServerTarget, secret: &str) -> Result<SshSession, ConnectError> {
        let fail = |detail: String| ConnectError {
            target: target.to_string(),
            detail,
        };

        let addr = (target.host.as_str(), target.port)
            .to_socket_addrs()
            .map_err(|e| fail(format!("address resolution: {e}")))?
            .next()
            .ok_or_else(|| fail("address resolution returned no addresses".to_string()))?;

        debug!(host = %target, "opening ssh session");
        let tcp = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|e| fail(e.to_string()))?;

        let mut session = ssh2::Session::new().map_err(|e| fail(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| fail(format!("handshake: {e}")))?;
        session
            .userauth_password(&target.username, secret)
            .map_err(|e| fail(format!("authentication: {e}")))?;

        // Bound command round-trips the same way as the connect.
        session.set_timeout(self.timeout.as_millis() as u32);

        Ok(SshSession {
            session,
            target: target.to_string(),
        })
    }
}

/// One open ssh2 session. Dropping it closes the TCP stream; `close` also
/// sends an explicit disconnect first.
pub struct SshSession {
    session: ssh2::Session,
    target: String,
}

impl CommandSession for SshSession {
    fn run(&mut self, command: &str) -> Result<CommandOutput, CommandError> {
        let fail = |detail: String| CommandError {
            command: command.to_string(),
            detail,
        };

        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| fail(e.to_string()))?;
        channel.exec(command).map_err(|e| fail(e.to_string()))?;

        let mut stdout = String::new();
        channel
            .read_to_string(&mut stdout)
            .map_err(|e| fail(e.to_string()))?;

        let _ = channel.wait_close();
        let ok = channel.exit_status().map(|code| code == 0).unwrap_or(false);
        debug!(host = %self.target, command, ok, "command finished");

        Ok(CommandOutput { stdout, ok })
    }

    fn close(&mut self) {
        debug!(host = %self.target, "closing ssh session");
        let _ = self.session.disconnect(None, "polling done", None);
    }
}
