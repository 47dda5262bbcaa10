//! `tc` command wrapper.

use std::process::{Command, Output};

use tracing::debug;

use crate::control::TrafficControl;
use crate::fault::{FaultError, FaultResult};

/// Stderr fragments `tc qdisc del` prints when there is nothing to delete.
const MISSING_QDISC_MESSAGES: [&str; 5] = [
    "no such file or directory",
    "no qdisc",
    "cannot delete qdisc with handle of zero",
    "no qdisc with this handle",
    "invalid qdisc handle",
];

/// Runs the host `tc` binary.
#[derive(Debug, Clone)]
pub struct Tc {
    binary: String,
}

impl Default for Tc {
    fn default() -> Self {
        Self::new("tc")
    }
}

impl Tc {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn render(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }

    fn output(&self, args: &[&str]) -> FaultResult<Output> {
        debug!(command = %self.render(args), "Executing tc command");
        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| FaultError::ExternalCommand {
                command: self.render(args),
                status: "spawn failed".to_string(),
                output: e.to_string(),
            })
    }

    fn failure(&self, args: &[&str], output: &Output) -> FaultError {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let text = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        FaultError::ExternalCommand {
            command: self.render(args),
            status: output.status.to_string(),
            output: text,
        }
    }
}

impl TrafficControl for Tc {
    fn add_delay(&self, interface: &str, delay_ms: u64) -> FaultResult<()> {
        let delay = format!("{}ms", delay_ms);
        let args = ["qdisc", "add", "dev", interface, "root", "netem", "delay", delay.as_str()];
        let output = self.output(&args)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(self.failure(&args, &output))
        }
    }

    fn clear(&self, interface: &str) -> FaultResult<()> {
        let args = ["qdisc", "del", "dev", interface, "root"];
        let output = self.output(&args)?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_missing_qdisc(&stderr) {
            debug!(interface, stderr = %stderr.trim(), "No tc rule to clear");
            return Ok(());
        }
        Err(self.failure(&args, &output))
    }
}

/// Whether `tc qdisc del` output means the rule was already absent.
pub fn is_missing_qdisc(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    MISSING_QDISC_MESSAGES.iter().any(|msg| lower.contains(msg))
}
