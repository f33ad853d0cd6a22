//! Top-level error type and exit-code mapping.
//!
//! Every error category is terminal for the process.  Components return them
//! as values; only `main.rs` turns them into an exit status.

use thiserror::Error;

use crate::application::ReadError;
use crate::domain::ConfigError;
use crate::infrastructure::ConnectError;

/// A fatal probe failure.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Invalid options, detected before connecting.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The handshake could not be completed.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// The connection failed or was closed while reading frames.
    #[error(transparent)]
    Read(#[from] ReadError),
}

impl ProbeError {
    /// Process exit status for this error.
    ///
    /// | Category        | Code |
    /// |-----------------|------|
    /// | configuration   | 1    |
    /// | handshake       | 2    |
    /// | read / close    | 3    |
    pub fn exit_code(&self) -> i32 {
        match self {
            ProbeError::Config(_) => 1,
            ProbeError::Connect(_) => 2,
            ProbeError::Read(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_exit_with_1() {
        let err = ProbeError::from(ConfigError::EmptyUrl);
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "missing url");
    }

    #[test]
    fn test_connect_errors_exit_with_2() {
        let err = ProbeError::from(ConnectError::InvalidHeader {
            name: "X".to_string(),
            reason: "bad".to_string(),
        });
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_read_errors_exit_with_3() {
        let err = ProbeError::from(ReadError::EndOfStream);
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "connection stream ended");
    }
}
