//! Fault error definitions.

use thiserror::Error;

/// Errors returned by fault operations.
///
/// These only reach callers that drive a [`Fault`](crate::fault::Fault)
/// directly. The [`FaultManager`](crate::fault::FaultManager) logs and
/// discards them.
#[derive(Debug, Error)]
pub enum FaultError {
    /// Requested fault name is not registered.
    #[error("Unknown fault: {0}")]
    UnknownFault(String),

    /// The traffic-control command failed.
    #[error("Command `{command}` failed ({status}): {output}")]
    ExternalCommand {
        command: String,
        status: String,
        output: String,
    },

    /// The cache proxy control plane was unreachable or rejected the request.
    #[error("Control plane request failed: {0}")]
    ExternalService(String),
}

impl FaultError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FaultError::UnknownFault(_) => "unknown_fault",
            FaultError::ExternalCommand { .. } => "external_command",
            FaultError::ExternalService(_) => "external_service",
        }
    }
}

/// Result type for fault operations.
pub type FaultResult<T> = Result<T, FaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FaultError::ExternalCommand {
            command: "tc qdisc add dev eth0 root netem delay 200ms".into(),
            status: "exit status: 2".into(),
            output: "RTNETLINK answers: Operation not permitted".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("tc qdisc add"));
        assert!(msg.contains("Operation not permitted"));

        let err = FaultError::UnknownFault("disk".into());
        assert_eq!(err.to_string(), "Unknown fault: disk");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(FaultError::ExternalService("down".into()).kind(), "external_service");
        assert_eq!(FaultError::UnknownFault("x".into()).kind(), "unknown_fault");
    }
}
