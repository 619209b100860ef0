use std::path::Path;
use std::process::{Command, Output};
use thiserror::Error;

/// Errors raised by a transport. Any of them makes the whole host unavailable.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{program} is not installed or not on PATH")]
    MissingTool { program: String },

    #[error("SSH connection failed: {0}")]
    Connection(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{program} failed: {stderr}")]
    Failed { program: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs commands on, and copies files from, a remote host.
pub trait Transport: Send + Sync {
    /// Run a shell command on `host` and return its stdout.
    fn run(&self, host: &str, command: &str) -> Result<String, TransportError>;

    /// Copy `remote_path` (relative to the remote home) to `local_path`.
    fn copy(&self, host: &str, remote_path: &str, local_path: &Path) -> Result<(), TransportError>;
}

/// Transport backed by the system `ssh`, `rsync` and `scp` binaries.
#[derive(Debug, Clone)]
pub struct SshTransport {
    connection_timeout: u64,
    transfer_timeout: u64,
}

impl Default for SshTransport {
    fn default() -> Self {
        Self {
            connection_timeout: 10,
            transfer_timeout: 300,
        }
    }
}

impl SshTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn ssh_options(&self) -> Vec<String> {
        vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connection_timeout),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
        ]
    }

    fn rsync(&self, host: &str, remote_path: &str, local_path: &Path) -> Result<Output, std::io::Error> {
        let remote_spec = format!("{}:{}", host, remote_path);
        let ssh = format!("ssh {}", self.ssh_options().join(" "));

        tracing::debug!(host, remote_path, local_path = %local_path.display(), "starting rsync");
        Command::new("rsync")
            .args([
                "-a",
                "--partial",
                "--protect-args",
                "--timeout",
                &self.transfer_timeout.to_string(),
                "-e",
                &ssh,
                "--",
                &remote_spec,
            ])
            .arg(local_path)
            .output()
    }

    fn scp(&self, host: &str, remote_path: &str, local_path: &Path) -> Result<Output, std::io::Error> {
        tracing::debug!(host, remote_path, local_path = %local_path.display(), "starting scp");
        Command::new("scp")
            .arg("-p")
            .args(self.ssh_options())
            .arg(format!("{}:{}", host, remote_path))
            .arg(local_path)
            .output()
    }
}

impl Transport for SshTransport {
    fn run(&self, host: &str, command: &str) -> Result<String, TransportError> {
        let output = Command::new("ssh")
            .args(self.ssh_options())
            .arg("--")
            .arg(host)
            .arg(command)
            .output()
            .map_err(|e| missing_or_io("ssh", e))?;

        check_output("ssh", &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn copy(&self, host: &str, remote_path: &str, local_path: &Path) -> Result<(), TransportError> {
        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match self.rsync(host, remote_path, local_path) {
            Ok(output) => check_output("rsync", &output),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let output = self
                    .scp(host, remote_path, local_path)
                    .map_err(|e| missing_or_io("scp", e))?;
                check_output("scp", &output)
            }
            Err(e) => Err(TransportError::Io(e)),
        }
    }
}

fn missing_or_io(program: &str, err: std::io::Error) -> TransportError {
    if err.kind() == std::io::ErrorKind::NotFound {
        TransportError::MissingTool {
            program: program.to_string(),
        }
    } else {
        TransportError::Io(err)
    }
}

fn check_output(program: &str, output: &Output) -> Result<(), TransportError> {
    if output.status.success() {
        return Ok(());
    }
    Err(classify_failure(
        program,
        output.status.code(),
        &String::from_utf8_lossy(&output.stderr),
    ))
}

/// Map stderr of a failed ssh/rsync/scp run to an error variant.
pub fn classify_failure(program: &str, code: Option<i32>, stderr: &str) -> TransportError {
    let stderr = stderr.trim().to_string();
    if stderr.contains("Permission denied") {
        TransportError::PermissionDenied(stderr)
    } else if code == Some(255)
        || stderr.contains("Connection refused")
        || stderr.contains("Connection timed out")
        || stderr.contains("Could not resolve hostname")
    {
        TransportError::Connection(stderr)
    } else {
        TransportError::Failed {
            program: program.to_string(),
            stderr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure("ssh", Some(255), "ssh: Could not resolve hostname vm9"),
            TransportError::Connection(_)
        ));
        assert!(matches!(
            classify_failure("ssh", Some(255), "me@vm01: Permission denied (publickey)."),
            TransportError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_failure("rsync", Some(23), "some files vanished"),
            TransportError::Failed { .. }
        ));
    }

    #[test]
    fn test_ssh_options_are_batch_mode() {
        let transport = SshTransport {
            connection_timeout: 3,
            ..SshTransport::default()
        };
        let opts = transport.ssh_options();
        assert!(opts.contains(&"BatchMode=yes".to_string()));
        assert!(opts.contains(&"ConnectTimeout=3".to_string()));
    }
}
