//! wsprobe: entry point.
//!
//! Opens one WebSocket connection, sends every line typed on standard input
//! as a text frame and prints every inbound frame, pretty-printed when it is
//! JSON.  Stop it with Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! wsprobe [OPTIONS]
//!
//! Options:
//!   -u, --url <URL>          Endpoint [default: ws://localhost:8080/api/v1/kubeql]
//!   -o, --origin <URL>       Origin header; "" disables it [default: http://localhost:8080]
//!   -c, --command <TEXT>     Initial command sent right after connecting
//!   -p, --plain              Plain (no colour) output
//!   -H, --header <NAME: VALUE>  Extra handshake header, repeatable
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable         | Default                             |
//! |------------------|-------------------------------------|
//! | `WSPROBE_URL`    | `ws://localhost:8080/api/v1/kubeql` |
//! | `WSPROBE_ORIGIN` | `http://localhost:8080`             |
//!
//! # Exit status
//!
//! `0` after Ctrl+C, `1` for invalid options, `2` when the handshake fails,
//! `3` when reading from the connection fails (including a close by the
//! server).

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing_subscriber::EnvFilter;

use wsprobe::application::{run_session, SessionOptions, SessionOutcome, Transcript};
use wsprobe::domain::{ConfigError, ProbeConfig, DEFAULT_ORIGIN, DEFAULT_TARGET};
use wsprobe::infrastructure::{establish, spawn_shutdown_trap, ConsoleTranscript};
use wsprobe::ProbeError;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Interactive WebSocket probing client.
///
/// Lines typed on standard input are sent as text frames (`>>`); inbound
/// frames are printed re-indented (`<<`).
#[derive(Debug, Parser)]
#[command(name = "wsprobe", version)]
struct Cli {
    /// The URL to connect to.
    #[arg(short = 'u', long = "url", default_value = DEFAULT_TARGET, env = "WSPROBE_URL")]
    url: String,

    /// The origin to use in the WebSocket request; an empty string disables it.
    #[arg(short = 'o', long, default_value = DEFAULT_ORIGIN, env = "WSPROBE_ORIGIN")]
    origin: String,

    /// The initial command to send once connected.
    #[arg(short = 'c', long = "command", value_name = "TEXT")]
    command: Option<String>,

    /// Use plain (no colour) output.
    #[arg(short = 'p', long)]
    plain: bool,

    /// Header to use in the WebSocket request; can be given multiple times.
    ///
    /// Example: -H "Sample-Header-1: foo" -H "Sample-Header-2: bar"
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,
}

impl Cli {
    /// Converts the parsed arguments into a [`ProbeConfig`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty URL, an unparseable origin or a
    /// header without a colon.
    fn into_probe_config(self) -> Result<ProbeConfig, ConfigError> {
        ProbeConfig::new(
            &self.url,
            &self.origin,
            &self.headers,
            self.command,
            !self.plain,
        )
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// The runtime is built by hand rather than with `#[tokio::main]`: Tokio reads
/// stdin on a blocking thread, and a runtime dropped normally would wait for
/// that read to finish.  After the session ends the runtime is shut down in
/// the background and the process exits with the session's status.
fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the `>>` / `<<` transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the Tokio runtime")?;

    let code = match runtime.block_on(run(cli)) {
        Ok(()) => 0,
        Err(e) => {
            error!("{e}");
            e.exit_code()
        }
    };

    runtime.shutdown_background();
    std::process::exit(code);
}

/// Connects and runs the session until Ctrl+C or a fatal error.
async fn run(cli: Cli) -> Result<(), ProbeError> {
    let config = cli.into_probe_config()?;
    let (sink, source) = establish(&config).await?;

    let cancel = CancellationToken::new();
    let force = CancellationToken::new();
    let _trap = spawn_shutdown_trap(cancel.clone(), force.clone());

    let transcript: Arc<dyn Transcript> = Arc::new(ConsoleTranscript::stdout());
    let input = BufReader::new(tokio::io::stdin());

    let session = run_session(
        sink,
        source,
        input,
        SessionOptions::from(&config),
        transcript,
        cancel,
    );

    tokio::select! {
        outcome = session => match outcome {
            SessionOutcome::Interrupted => Ok(()),
            SessionOutcome::ReadFailed(e) => Err(e.into()),
        },
        // A second Ctrl+C stops waiting for the graceful close.
        () = force.cancelled() => Ok(()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["wsprobe"]);

        // Assert
        assert_eq!(cli.url, DEFAULT_TARGET);
        assert_eq!(cli.origin, DEFAULT_ORIGIN);
        assert!(cli.command.is_none());
        assert!(!cli.plain);
        assert!(cli.headers.is_empty());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "wsprobe",
            "-u",
            "ws://10.0.0.5:9000/ws",
            "-o",
            "http://10.0.0.5",
            "-c",
            "{\"op\":\"list\"}",
            "-p",
        ]);
        assert_eq!(cli.url, "ws://10.0.0.5:9000/ws");
        assert_eq!(cli.origin, "http://10.0.0.5");
        assert_eq!(cli.command.as_deref(), Some("{\"op\":\"list\"}"));
        assert!(cli.plain);
    }

    #[test]
    fn test_cli_repeated_headers_keep_order() {
        let cli = Cli::parse_from([
            "wsprobe",
            "-H",
            "Sample-Header-1: foo",
            "-H",
            "Sample-Header-2: bar",
            "-H",
            "Sample-Header-1: baz",
        ]);
        assert_eq!(
            cli.headers,
            vec![
                "Sample-Header-1: foo",
                "Sample-Header-2: bar",
                "Sample-Header-1: baz"
            ]
        );
    }

    #[test]
    fn test_cli_accepts_empty_origin() {
        let cli = Cli::parse_from(["wsprobe", "-o", ""]);
        assert_eq!(cli.origin, "");
        let config = cli.into_probe_config().unwrap();
        assert!(config.origin.is_none());
    }

    #[test]
    fn test_into_probe_config_plain_disables_colour() {
        let config = Cli::parse_from(["wsprobe", "-p"]).into_probe_config().unwrap();
        assert!(!config.colour);
    }

    #[test]
    fn test_into_probe_config_trims_headers() {
        let config = Cli::parse_from(["wsprobe", "-H", "  K  :  V  "])
            .into_probe_config()
            .unwrap();
        assert_eq!(config.headers.iter().collect::<Vec<_>>(), vec![("K", "V")]);
    }

    #[test]
    fn test_into_probe_config_empty_url_is_exit_code_1() {
        let err = Cli::parse_from(["wsprobe", "-u", ""])
            .into_probe_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyUrl));
        assert_eq!(ProbeError::from(err).exit_code(), 1);
    }

    #[test]
    fn test_into_probe_config_bad_origin_is_exit_code_1() {
        let err = Cli::parse_from(["wsprobe", "-o", "no scheme here"])
            .into_probe_config()
            .unwrap_err();
        assert_eq!(ProbeError::from(err).exit_code(), 1);
    }
}
