//! SSH port forwarding to the status service.
//!
//! The status service listens on a port of the job queue server that is not
//! reachable from outside, so jqmon forwards a local port to it with
//! `ssh -N -L`. The ssh child lives as long as the [`Tunnel`] value.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// How the ssh binary was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathResolution {
    /// Explicitly configured via config file or environment variable
    Configured,
    /// Found in PATH
    AutoDetected,
    /// Not found; relying on the OS to resolve plain `ssh`
    Fallback,
}

/// Find the ssh binary.
///
/// Resolution order:
/// 1. Explicit path from configuration, if it is an existing file.
/// 2. Auto-detect via PATH using the `which` crate.
/// 3. Plain `ssh`, leaving resolution to process spawning.
pub fn find_ssh(config_path: Option<&Path>) -> (PathBuf, PathResolution) {
    if let Some(path) = config_path {
        if path.is_file() {
            return (path.to_path_buf(), PathResolution::Configured);
        }
        tracing::warn!(
            path = %path.display(),
            "configured ssh_path is not a file, trying auto-detection"
        );
    }

    if let Ok(path) = which::which("ssh") {
        return (path, PathResolution::AutoDetected);
    }

    (PathBuf::from("ssh"), PathResolution::Fallback)
}

/// Ask the OS for a currently free local TCP port.
pub fn pick_free_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Everything needed to start a tunnel.
#[derive(Debug, Clone)]
pub struct TunnelSpec {
    pub ssh: PathBuf,
    pub server: String,
    pub local_port: u16,
    pub remote_port: u16,
    /// Command run on the server (e.g. to start the status service). Without
    /// one ssh only forwards (`-N`).
    pub remote_command: Option<String>,
}

impl TunnelSpec {
    /// Arguments passed to ssh.
    #[must_use]
    pub fn ssh_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "ExitOnForwardFailure=yes".to_string(),
            "-L".to_string(),
            format!("{}:localhost:{}", self.local_port, self.remote_port),
        ];

        match &self.remote_command {
            Some(command) => {
                args.push(self.server.clone());
                args.push(command.clone());
            }
            None => {
                args.insert(0, "-N".to_string());
                args.push(self.server.clone());
            }
        }

        args
    }
}

/// A running ssh port forward. Dropping it terminates ssh.
#[derive(Debug)]
pub struct Tunnel {
    child: Child,
    local_port: u16,
}

/// Delay between reachability probes while waiting for the forward.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

impl Tunnel {
    /// Spawn ssh and block until the local end accepts connections.
    ///
    /// Fails if ssh cannot be started, exits early (bad host, port already
    /// forwarded), or the port is not reachable within `wait`.
    pub fn open(spec: &TunnelSpec, wait: Duration) -> Result<Self> {
        tracing::info!(
            server = %spec.server,
            local_port = spec.local_port,
            remote_port = spec.remote_port,
            "opening ssh tunnel"
        );

        let child = Command::new(&spec.ssh)
            .args(spec.ssh_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(Error::TunnelSpawn)?;

        let mut tunnel = Self {
            child,
            local_port: spec.local_port,
        };
        tunnel.wait_until_ready(wait)?;
        Ok(tunnel)
    }

    fn wait_until_ready(&mut self, wait: Duration) -> Result<()> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.local_port));
        let started = Instant::now();

        loop {
            if let Some(status) = self.child.try_wait().map_err(Error::TunnelSpawn)? {
                return Err(Error::TunnelExited { status });
            }

            if TcpStream::connect_timeout(&addr, POLL_INTERVAL).is_ok() {
                tracing::debug!(elapsed = ?started.elapsed(), "tunnel ready");
                return Ok(());
            }

            if started.elapsed() >= wait {
                return Err(Error::TunnelTimeout {
                    port: self.local_port,
                    waited: wait,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    #[must_use]
    pub fn local_port(&self) -> u16 {
        self.local_port
    }
}

impl Drop for Tunnel {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            tracing::debug!("failed to kill ssh: {}", e);
        }
        let _ = self.child.wait();
        tracing::info!(local_port = self.local_port, "ssh tunnel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(remote_command: Option<&str>) -> TunnelSpec {
        TunnelSpec {
            ssh: PathBuf::from("ssh"),
            server: "pbs-head".to_string(),
            local_port: 40123,
            remote_port: 8765,
            remote_command: remote_command.map(str::to_string),
        }
    }

    #[test]
    fn test_ssh_args_forward_only() {
        assert_eq!(
            spec(None).ssh_args(),
            [
                "-N",
                "-o",
                "ExitOnForwardFailure=yes",
                "-L",
                "40123:localhost:8765",
                "pbs-head"
            ]
        );
    }

    #[test]
    fn test_ssh_args_with_remote_command() {
        let args = spec(Some("jobqueue-status --port 8765")).ssh_args();
        assert!(!args.contains(&"-N".to_string()));
        assert_eq!(args[args.len() - 2], "pbs-head");
        assert_eq!(args[args.len() - 1], "jobqueue-status --port 8765");
    }

    #[test]
    fn test_pick_free_port() {
        let port = pick_free_port().unwrap();
        assert_ne!(port, 0);
    }

    #[test]
    fn test_find_ssh_prefers_existing_config_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let (path, resolution) = find_ssh(Some(file.path()));
        assert_eq!(path, file.path());
        assert_eq!(resolution, PathResolution::Configured);
    }

    #[test]
    fn test_find_ssh_ignores_missing_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let (_, resolution) = find_ssh(Some(&dir.path().join("nope")));
        assert_ne!(resolution, PathResolution::Configured);
    }

    #[test]
    fn test_open_reports_early_exit() {
        // `false` exits immediately, standing in for an ssh that fails to connect
        let Ok(bin) = which::which("false") else {
            return;
        };
        let mut spec = spec(None);
        spec.ssh = bin;
        spec.local_port = pick_free_port().unwrap();

        let err = Tunnel::open(&spec, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::TunnelExited { .. }));
    }
}
