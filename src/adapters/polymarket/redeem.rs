//! Redemption through the external proxy-wallet script, one child process per call.

use crate::domain::redeem_output::{preview, tx_hint_lines, STDERR_PREVIEW_CHARS};
use crate::models::{short_id, RedeemOutcome};
use crate::services::redemption_service::RedeemExecutor;
use async_trait::async_trait;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

pub const REDEEM_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs `<command> <script> <conditionId> <true|false>` from the script's own directory.
pub struct ScriptRedeemer {
    command: String,
    script: PathBuf,
    timeout: Duration,
}

impl ScriptRedeemer {
    pub fn new(command: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            script: script.into(),
            timeout: REDEEM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Working directory and the script argument relative to it.
    fn invocation(&self) -> (Option<&Path>, &Path) {
        match (self.script.parent(), self.script.file_name()) {
            (Some(dir), Some(name)) if !dir.as_os_str().is_empty() => (Some(dir), Path::new(name)),
            _ => (None, self.script.as_path()),
        }
    }

    async fn run(&self, condition_id: &str, neg_risk: bool) -> RedeemOutcome {
        let (dir, script) = self.invocation();
        let mut cmd = Command::new(&self.command);
        cmd.arg(script)
            .arg(condition_id)
            .arg(neg_risk.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return RedeemOutcome::ExecutionError(format!(
                    "failed to launch {}: {}",
                    self.command, e
                ))
            }
        };

        // On timeout the child is dropped here and killed.
        match timeout(self.timeout, child.wait_with_output()).await {
            Err(_) => RedeemOutcome::Timeout {
                after: self.timeout,
            },
            Ok(Err(e)) => RedeemOutcome::ExecutionError(format!("redeem process error: {}", e)),
            Ok(Ok(output)) => classify(output),
        }
    }
}

fn classify(output: Output) -> RedeemOutcome {
    match output.status.code() {
        Some(0) => RedeemOutcome::Success {
            tx_hints: tx_hint_lines(&String::from_utf8_lossy(&output.stdout)),
        },
        Some(exit_code) => RedeemOutcome::Failure {
            exit_code,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        None => RedeemOutcome::ExecutionError(format!(
            "redeem process ended without an exit code ({})",
            output.status
        )),
    }
}

fn log_outcome(condition_id: &str, outcome: &RedeemOutcome) {
    match outcome {
        RedeemOutcome::Success { tx_hints } => {
            info!("Redeem executed successfully!");
            for line in tx_hints {
                info!("   {}", line);
            }
        }
        RedeemOutcome::Failure { exit_code, stderr } => {
            error!("Redeem failed (exit code: {})", exit_code);
            if !stderr.is_empty() {
                error!("   Error: {}", preview(stderr, STDERR_PREVIEW_CHARS));
            }
        }
        RedeemOutcome::Timeout { .. } => {
            warn!("Timeout while redeeming {}...", short_id(condition_id));
        }
        RedeemOutcome::ExecutionError(e) => {
            error!("Error executing redeem: {}", e);
        }
    }
}

#[async_trait]
impl RedeemExecutor for ScriptRedeemer {
    async fn execute(&self, condition_id: &str, neg_risk: bool) -> RedeemOutcome {
        info!(
            "Executing redeem for {}... (negRisk={})",
            short_id(condition_id),
            neg_risk
        );
        let outcome = self.run(condition_id, neg_risk).await;
        log_outcome(condition_id, &outcome);
        outcome
    }
}
