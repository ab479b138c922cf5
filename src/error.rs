//! Error types shared by the library modules.
//!
//! Missing attributes are deliberately absent from this enum: a lookup miss is
//! resolved by the placeholder of the consuming table, never raised.

use std::time::Duration;

/// Errors produced while decoding, searching, querying or tunnelling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structurally invalid server data (e.g. a malformed `state_count` string).
    #[error("malformed state count '{input}': {reason}")]
    Format { input: String, reason: String },

    /// The user typed a regular expression that does not compile.
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Network failure, timeout or undecodable body on a status query.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The status service answered with a non-success status where one is required.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The ssh process could not be started.
    #[error("failed to start ssh: {0}")]
    TunnelSpawn(#[source] std::io::Error),

    /// The ssh process exited before the forwarded port became reachable.
    #[error("ssh exited before the tunnel was ready ({status})")]
    TunnelExited { status: std::process::ExitStatus },

    /// The forwarded port did not accept connections in time.
    #[error("local port {port} not reachable after {waited:?}")]
    TunnelTimeout { port: u16, waited: Duration },

    /// Invalid configuration value (only raised in strict mode).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn format(input: &str, reason: impl Into<String>) -> Self {
        Error::Format {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
