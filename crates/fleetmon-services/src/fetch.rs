//! Per-target fetch orchestration.
//!
//! Each target goes through connect -> mandatory command -> optional
//! command -> parse, strictly one target at a time. Any per-target error
//! becomes that target's `Failure`; nothing here ever aborts the cycle.

use tracing::{debug, info, warn};

use fleetmon_core::{parse_gpu_table, parse_storage_table, FetchResult, HostReport, ServerTarget};

use crate::connector::{CommandSession, Connector};

/// Optional GPU diagnostic. Absence is a normal outcome, not a failure.
pub const GPU_COMMAND: &str = "nvidia-smi";
/// Mandatory filesystem diagnostic. Failure marks the whole target failed.
pub const STORAGE_COMMAND: &str = "df -h";
/// Substituted for the GPU command's output when it is unavailable; parses
/// to an empty record set.
pub const NO_GPU_SENTINEL: &str = "No GPU information available";

/// Drives one poll cycle over a target list.
pub struct Fetcher<C> {
    connector: C,
}

impl<C: Connector> Fetcher<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Poll every target in order, one at a time, collecting exactly one
    /// report per target. A failing target never stops the walk.
    pub fn poll_all(&self, targets: &[ServerTarget], secret: &str) -> Vec<HostReport> {
        info!(targets = targets.len(), "starting poll cycle");
        targets
            .iter()
            .map(|target| HostReport {
                target: target.clone(),
                result: self.poll_one(target, secret),
            })
            .collect()
    }

    /// Poll one target. The session is released on every exit path.
    pub fn poll_one(&self, target: &ServerTarget, secret: &str) -> FetchResult {
        let mut session = match self.connector.connect(target, secret) {
            Ok(session) => session,
            Err(e) => {
                warn!(host = %target, error = %e, "connection failed");
                return FetchResult::Failure {
                    message: e.to_string(),
                };
            }
        };

        let result = poll_session(&mut session, target);
        session.close();
        result
    }
}

fn poll_session<S: CommandSession>(session: &mut S, target: &ServerTarget) -> FetchResult {
    let storage_raw = match session.run(STORAGE_COMMAND) {
        Ok(output) if output.ok => output.stdout,
        Ok(_) => {
            warn!(host = %target, command = STORAGE_COMMAND, "mandatory command exited nonzero");
            return FetchResult::Failure {
                message: format!("command `{STORAGE_COMMAND}` exited with nonzero status"),
            };
        }
        Err(e) => {
            warn!(host = %target, error = %e, "mandatory command failed");
            return FetchResult::Failure {
                message: e.to_string(),
            };
        }
    };

    // GPU availability is host-dependent; a missing binary or nonzero exit
    // just means this host has nothing to report.
    let gpu_raw = match session.run(GPU_COMMAND) {
        Ok(output) if output.ok => output.stdout,
        Ok(_) | Err(_) => {
            debug!(host = %target, "gpu diagnostic unavailable, substituting sentinel");
            NO_GPU_SENTINEL.to_string()
        }
    };

    let gpus = parse_gpu_table(&gpu_raw);
    if gpus.dropped > 0 {
        warn!(host = %target, dropped = gpus.dropped, "short rows dropped from gpu table");
    }
    let storage = parse_storage_table(&storage_raw);
    if storage.dropped > 0 {
        warn!(host = %target, dropped = storage.dropped, "short rows dropped from storage table");
    }

    FetchResult::Success {
        gpus: gpus.records,
        storage: storage.records,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::connector::{CommandError, CommandOutput, ConnectError};

    const DF_FIXTURE: &str = "\
Filesystem      Size  Used Avail Use% Mounted on
/dev/sda1       100G   91G    9G  91% /
";

    const SMI_FIXTURE: &str = "\
NVIDIA-SMI 535.54.03   Driver Version: 535.54.03   CUDA Version: 12.2
+---------------------------------------------------------------------+
| 0 A100-SXM4-40GB P0 62W / 400W | 263MiB / 40536MiB | 12% Default |
";

    /// What a fake host does when polled.
    #[derive(Clone)]
    enum Script {
        RefuseConnection,
        MandatoryFails,
        NoGpu,
        Healthy,
    }

    #[derive(Clone)]
    struct FakeConnector {
        scripts: HashMap<String, Script>,
        closed: Arc<AtomicUsize>,
    }

    impl FakeConnector {
        fn new(scripts: &[(&str, Script)]) -> Self {
            Self {
                scripts: scripts
                    .iter()
                    .map(|(host, s)| (host.to_string(), s.clone()))
                    .collect(),
                closed: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn closed_sessions(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }
    }

    struct FakeSession {
        script: Script,
        closed: Arc<AtomicUsize>,
    }

    impl Connector for FakeConnector {
        type Session = FakeSession;

        fn connect(
            &self,
            target: &ServerTarget,
            _secret: &str,
        ) -> Result<FakeSession, ConnectError> {
            let script = self.scripts.get(&target.host).expect("unscripted host");
            match script {
                Script::RefuseConnection => Err(ConnectError {
                    target: target.to_string(),
                    detail: "connection refused".to_string(),
                }),
                other => Ok(FakeSession {
                    script: other.clone(),
                    closed: Arc::clone(&self.closed),
                }),
            }
        }
    }

    impl CommandSession for FakeSession {
        fn run(&mut self, command: &str) -> Result<CommandOutput, CommandError> {
            match (&self.script, command) {
                (Script::MandatoryFails, STORAGE_COMMAND) => Err(CommandError {
                    command: command.to_string(),
                    detail: "session dropped".to_string(),
                }),
                (_, STORAGE_COMMAND) => Ok(CommandOutput {
                    stdout: DF_FIXTURE.to_string(),
                    ok: true,
                }),
                (Script::NoGpu, GPU_COMMAND) => Ok(CommandOutput {
                    stdout: "sh: nvidia-smi: command not found\n".to_string(),
                    ok: false,
                }),
                (_, GPU_COMMAND) => Ok(CommandOutput {
                    stdout: SMI_FIXTURE.to_string(),
                    ok: true,
                }),
                _ => panic!("unexpected command: {command}"),
            }
        }

        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn target(host: &str) -> ServerTarget {
        ServerTarget {
            host: host.to_string(),
            username: "alice".to_string(),
            port: 22,
        }
    }

    #[test]
    fn one_report_per_target_in_order_despite_failures() {
        let connector = FakeConnector::new(&[
            ("10.0.0.1", Script::Healthy),
            ("10.0.0.2", Script::RefuseConnection),
            ("10.0.0.3", Script::Healthy),
        ]);
        let fetcher = Fetcher::new(connector);
        let targets = vec![target("10.0.0.1"), target("10.0.0.2"), target("10.0.0.3")];

        let reports = fetcher.poll_all(&targets, "secret");

        assert_eq!(reports.len(), 3);
        for (report, expected) in reports.iter().zip(&targets) {
            assert_eq!(&report.target, expected);
        }
        assert!(reports[0].result.is_success());
        assert!(!reports[1].result.is_success());
        assert!(reports[2].result.is_success());
    }

    #[test]
    fn connection_failure_carries_detail_and_no_records() {
        let connector = FakeConnector::new(&[("10.0.0.2", Script::RefuseConnection)]);
        let fetcher = Fetcher::new(connector);

        let result = fetcher.poll_one(&target("10.0.0.2"), "secret");

        match result {
            FetchResult::Failure { message } => {
                assert!(message.contains("connection refused"));
            }
            FetchResult::Success { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn mandatory_command_failure_fails_the_target() {
        let connector = FakeConnector::new(&[("10.0.0.4", Script::MandatoryFails)]);
        let fetcher = Fetcher::new(connector.clone());

        let result = fetcher.poll_one(&target("10.0.0.4"), "secret");

        assert!(matches!(result, FetchResult::Failure { .. }));
        // The session opened, so it must still have been closed.
        assert_eq!(connector.closed_sessions(), 1);
    }

    #[test]
    fn missing_gpu_diagnostic_still_succeeds_with_empty_gpus() {
        let connector = FakeConnector::new(&[("10.0.0.5", Script::NoGpu)]);
        let fetcher = Fetcher::new(connector);

        match fetcher.poll_one(&target("10.0.0.5"), "secret") {
            FetchResult::Success { gpus, storage } => {
                assert!(gpus.is_empty());
                assert_eq!(storage.len(), 1);
                assert_eq!(storage[0].use_percent, "91%");
            }
            FetchResult::Failure { message } => panic!("expected success, got: {message}"),
        }
    }

    #[test]
    fn healthy_target_reports_gpu_and_storage() {
        let connector = FakeConnector::new(&[("10.0.0.1", Script::Healthy)]);
        let fetcher = Fetcher::new(connector.clone());

        match fetcher.poll_one(&target("10.0.0.1"), "secret") {
            FetchResult::Success { gpus, storage } => {
                assert_eq!(gpus.len(), 1);
                assert_eq!(gpus[0].memory_used, "263MiB");
                assert_eq!(gpus[0].utilization, "12%");
                assert_eq!(storage.len(), 1);
            }
            FetchResult::Failure { message } => panic!("expected success, got: {message}"),
        }
        assert_eq!(connector.closed_sessions(), 1);
    }

    #[test]
    fn every_opened_session_is_closed() {
        let connector = FakeConnector::new(&[
            ("10.0.0.1", Script::Healthy),
            ("10.0.0.2", Script::RefuseConnection),
            ("10.0.0.4", Script::MandatoryFails),
            ("10.0.0.5", Script::NoGpu),
        ]);
        let fetcher = Fetcher::new(connector.clone());
        let targets = vec![
            target("10.0.0.1"),
            target("10.0.0.2"),
            target("10.0.0.4"),
            target("10.0.0.5"),
        ];

        let reports = fetcher.poll_all(&targets, "secret");

        assert_eq!(reports.len(), 4);
        // The refused connection never opened a session; the other three did.
        assert_eq!(connector.closed_sessions(), 3);
    }
}
