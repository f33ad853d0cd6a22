//! WebSocket handshake and the tokio-tungstenite connection halves.
//!
//! [`establish`] builds the client handshake request from a [`ProbeConfig`],
//! performs the handshake and splits the resulting stream into a
//! [`WsFrameSink`] and a [`WsFrameSource`].
//!
//! # Handshake headers
//!
//! - `-o` becomes the `Origin` header (ASCII origin serialization).
//! - Each `-H` entry is **appended**, so repeated names produce repeated
//!   header lines in command-line order.
//! - Headers the handshake itself manages (`Host`, `Upgrade`, `Connection`,
//!   `Sec-WebSocket-Key`, `Sec-WebSocket-Version`, `Sec-WebSocket-Accept`) are
//!   skipped with a warning, as is `-H Origin` when `-o` is also set.
//!
//! # Duplex safety
//!
//! `futures_util`'s `split` hands each half its own handle onto the stream,
//! coordinated internally, so the sink and the source can be driven from
//! different tasks without any lock of ours.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{
    self,
    client::IntoClientRequest,
    handshake::client::Request,
    http::{header, HeaderName, HeaderValue},
    Message,
};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use wsprobe_core::InboundFrame;

use crate::application::duplex::{FrameSink, FrameSource, ReadError, WriteError};
use crate::domain::ProbeConfig;

/// Close code reported when a Close frame carries no status (RFC 6455 §7.1.5).
const NO_STATUS_RECEIVED: u16 = 1005;

/// Header names set by the handshake; user copies would be duplicates.
const HANDSHAKE_MANAGED: &[&str] = &[
    "host",
    "upgrade",
    "connection",
    "sec-websocket-key",
    "sec-websocket-version",
    "sec-websocket-accept",
];

/// Errors that prevent a connection from being established.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The target could not be turned into a handshake request.
    #[error("invalid WebSocket URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// A header name or value is not valid HTTP.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The TCP connect or the WebSocket upgrade failed.
    #[error("WebSocket handshake with {url} failed: {source}")]
    Handshake {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
}

/// Sink half over a real TCP (or TLS) connection.
pub type TcpFrameSink = WsFrameSink<MaybeTlsStream<TcpStream>>;

/// Source half over a real TCP (or TLS) connection.
pub type TcpFrameSource = WsFrameSource<MaybeTlsStream<TcpStream>>;

/// Builds the client handshake request for `config`.
///
/// # Errors
///
/// [`ConnectError::InvalidUrl`] if the target is not a usable WebSocket URL,
/// [`ConnectError::InvalidHeader`] if a header is not valid HTTP.
pub fn build_request(config: &ProbeConfig) -> Result<Request, ConnectError> {
    let mut request = config
        .target
        .as_str()
        .into_client_request()
        .map_err(|source| ConnectError::InvalidUrl {
            url: config.target.clone(),
            source,
        })?;

    let origin = config.origin_header();
    let headers = request.headers_mut();

    if let Some(origin) = &origin {
        let value = HeaderValue::from_str(origin).map_err(|e| ConnectError::InvalidHeader {
            name: header::ORIGIN.to_string(),
            reason: e.to_string(),
        })?;
        headers.insert(header::ORIGIN, value);
    }

    for (name, value) in config.headers.iter() {
        if HANDSHAKE_MANAGED
            .iter()
            .any(|managed| name.eq_ignore_ascii_case(managed))
        {
            warn!("ignoring header '{name}': it is set by the WebSocket handshake");
            continue;
        }
        if origin.is_some() && name.eq_ignore_ascii_case(header::ORIGIN.as_str()) {
            warn!("ignoring header '{name}': the origin option takes precedence");
            continue;
        }

        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConnectError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ConnectError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        headers.append(header_name, header_value);
    }

    Ok(request)
}

/// Performs the handshake described by `config` and returns the split
/// connection.
///
/// No retry is attempted; every failure is returned to the caller.
///
/// # Errors
///
/// Any [`ConnectError`].
pub async fn establish(
    config: &ProbeConfig,
) -> Result<(TcpFrameSink, TcpFrameSource), ConnectError> {
    let request = build_request(config)?;

    info!("connecting to {}...", config.target);
    let (ws_stream, response) =
        connect_async(request)
            .await
            .map_err(|source| ConnectError::Handshake {
                url: config.target.clone(),
                source,
            })?;
    debug!("handshake accepted with HTTP {}", response.status());
    info!("ready, exit with CTRL+C.");

    Ok(split(ws_stream))
}

/// Splits an established WebSocket stream into its two halves.
pub fn split<T>(ws_stream: WebSocketStream<T>) -> (WsFrameSink<T>, WsFrameSource<T>)
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let (sink, stream) = ws_stream.split();
    (WsFrameSink { sink }, WsFrameSource { stream })
}

/// Outbound half of a tokio-tungstenite connection.
pub struct WsFrameSink<T> {
    sink: SplitSink<WebSocketStream<T>, Message>,
}

#[async_trait]
impl<T> FrameSink for WsFrameSink<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_text(&mut self, text: &str) -> Result<(), WriteError> {
        self.sink
            .send(Message::Text(text.to_string()))
            .await
            .map_err(write_error)
    }

    async fn close(&mut self) -> Result<(), WriteError> {
        // `SinkExt::close` sends a Close frame and flushes it.
        self.sink.close().await.map_err(write_error)
    }
}

/// Inbound half of a tokio-tungstenite connection.
pub struct WsFrameSource<T> {
    stream: SplitStream<WebSocketStream<T>>,
}

#[async_trait]
impl<T> FrameSource for WsFrameSource<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn next_frame(&mut self) -> Result<InboundFrame, ReadError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(InboundFrame::from_payload(text.into_bytes()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(InboundFrame::from_payload(data));
                }
                Some(Ok(Message::Ping(data))) => {
                    // tungstenite queues the Pong reply itself.
                    debug!("WebSocket ping ({} bytes)", data.len());
                }
                Some(Ok(Message::Pong(_))) => debug!("WebSocket pong received"),
                Some(Ok(Message::Frame(_))) => debug!("raw frame (ignored)"),
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.into_owned()))
                        .unwrap_or((NO_STATUS_RECEIVED, String::new()));
                    return Err(ReadError::Closed { code, reason });
                }
                Some(Err(e)) => return Err(ReadError::Transport(e.to_string())),
                None => return Err(ReadError::EndOfStream),
            }
        }
    }
}

fn write_error(e: tungstenite::Error) -> WriteError {
    match e {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            WriteError::Closed
        }
        other => WriteError::Transport(other.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_ORIGIN, DEFAULT_TARGET};

    fn config(origin: &str, headers: &[&str]) -> ProbeConfig {
        ProbeConfig::new(DEFAULT_TARGET, origin, headers, None, true).unwrap()
    }

    fn values<'a>(request: &'a Request, name: &str) -> Vec<&'a str> {
        request
            .headers()
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect()
    }

    #[test]
    fn test_request_targets_configured_url() {
        let request = build_request(&config(DEFAULT_ORIGIN, &[])).unwrap();
        assert_eq!(request.uri().to_string(), DEFAULT_TARGET);
        assert_eq!(values(&request, "host"), vec!["localhost:8080"]);
    }

    #[test]
    fn test_origin_header_is_set() {
        let request = build_request(&config(DEFAULT_ORIGIN, &[])).unwrap();
        assert_eq!(values(&request, "origin"), vec!["http://localhost:8080"]);
    }

    #[test]
    fn test_empty_origin_sends_no_origin_header() {
        let request = build_request(&config("", &[])).unwrap();
        assert!(values(&request, "origin").is_empty());
    }

    #[test]
    fn test_duplicate_headers_are_appended_in_order() {
        // Arrange
        let cfg = config(
            DEFAULT_ORIGIN,
            &["X-Trace: 1", "Authorization: Bearer t", "X-Trace: 2"],
        );

        // Act
        let request = build_request(&cfg).unwrap();

        // Assert
        assert_eq!(values(&request, "x-trace"), vec!["1", "2"]);
        assert_eq!(values(&request, "authorization"), vec!["Bearer t"]);
    }

    #[test]
    fn test_handshake_managed_headers_are_skipped() {
        let request = build_request(&config(
            DEFAULT_ORIGIN,
            &["Host: evil.example", "Sec-WebSocket-Version: 8"],
        ))
        .unwrap();
        assert_eq!(values(&request, "host"), vec!["localhost:8080"]);
        assert_eq!(values(&request, "sec-websocket-version"), vec!["13"]);
    }

    #[test]
    fn test_origin_option_wins_over_origin_header() {
        let request =
            build_request(&config(DEFAULT_ORIGIN, &["Origin: http://other"])).unwrap();
        assert_eq!(values(&request, "origin"), vec!["http://localhost:8080"]);
    }

    #[test]
    fn test_origin_header_used_when_option_disabled() {
        let request = build_request(&config("", &["Origin: http://other"])).unwrap();
        assert_eq!(values(&request, "origin"), vec!["http://other"]);
    }

    #[test]
    fn test_invalid_header_value_is_rejected() {
        let result = build_request(&config(DEFAULT_ORIGIN, &["X-Bad: line\u{7f}break"]));
        assert!(matches!(result, Err(ConnectError::InvalidHeader { .. })));
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let cfg = ProbeConfig {
            target: "ws://bad host/".to_string(),
            ..ProbeConfig::default()
        };
        assert!(matches!(
            build_request(&cfg),
            Err(ConnectError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_handshake_error() {
        let cfg = ProbeConfig {
            target: "ws://127.0.0.1:1/".to_string(),
            ..ProbeConfig::default()
        };
        assert!(matches!(
            establish(&cfg).await,
            Err(ConnectError::Handshake { .. })
        ));
    }
}
