//! Live log stream over a WebSocket with automatic reconnection.
//!
//! [`LogStream::spawn`] starts a background task that owns the socket and
//! reports everything it sees as [`StreamEvent`]s on a channel, in the order
//! the transport delivered them. The task runs until the receiving side of
//! the channel is dropped, whether it is mid-session, waiting to retry, or
//! about to send.

use std::time::Duration;

use futures_util::StreamExt;
use logtide_types::LogRecord;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

use crate::connection::{ConnectionMachine, ReconnectPolicy};

/// Upper bound on a single connection handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle and payload notifications from the stream task.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A connection attempt has started.
    Connecting { attempt: u64 },
    /// The socket is open and records may follow.
    Opened,
    /// One decoded log record.
    Record(LogRecord),
    /// A message arrived that is not a log record; it was skipped.
    Malformed { payload: String, error: String },
    /// The connection ended or could not be established. The next attempt
    /// starts after `retry_in`.
    Closed { reason: Option<String>, retry_in: Duration },
}

/// Decode a single inbound message into a record.
pub fn decode_record(payload: &str) -> Result<LogRecord, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Handle to a configured, not yet running stream.
#[derive(Debug, Clone)]
pub struct LogStream {
    url: Url,
    policy: ReconnectPolicy,
}

enum SessionEnd {
    Closed(Option<String>),
    ReceiverGone,
}

impl LogStream {
    pub fn new(url: Url, policy: ReconnectPolicy) -> Self {
        Self { url, policy }
    }

    /// Run the connect/read/reconnect loop on the Tokio runtime.
    pub fn spawn(self, sender: mpsc::Sender<StreamEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(sender))
    }

    async fn run(self, sender: mpsc::Sender<StreamEvent>) {
        let mut machine = ConnectionMachine::new(self.policy);
        loop {
            let attempt = machine.begin_attempt();
            info!(url = %self.url, attempt, "connecting to log stream");
            if sender.send(StreamEvent::Connecting { attempt }).await.is_err() {
                return;
            }

            let reason = match tokio::time::timeout(CONNECT_TIMEOUT, connect_async(self.url.as_str())).await {
                Ok(Ok((socket, _response))) => {
                    machine.opened();
                    info!(url = %self.url, "connected to log stream");
                    if sender.send(StreamEvent::Opened).await.is_err() {
                        return;
                    }
                    match pump(socket, &sender).await {
                        SessionEnd::Closed(reason) => reason,
                        SessionEnd::ReceiverGone => return,
                    }
                }
                Ok(Err(error)) => {
                    warn!(url = %self.url, error = %error, "log stream connection failed");
                    Some(error.to_string())
                }
                Err(_) => {
                    warn!(url = %self.url, timeout = ?CONNECT_TIMEOUT, "log stream connection timed out");
                    Some(format!("connection timed out after {}s", CONNECT_TIMEOUT.as_secs()))
                }
            };

            let retry_in = machine.closed();
            info!(retry_in = ?retry_in, reason = reason.as_deref().unwrap_or("closed"), "disconnected from log stream");
            if sender.send(StreamEvent::Closed { reason, retry_in }).await.is_err() {
                return;
            }
            tokio::select! {
                _ = tokio::time::sleep(retry_in) => {}
                _ = sender.closed() => return,
            }
        }
    }
}

/// Read frames until the socket closes, forwarding records in order.
async fn pump(mut socket: Socket, sender: &mpsc::Sender<StreamEvent>) -> SessionEnd {
    loop {
        let frame = tokio::select! {
            frame = socket.next() => frame,
            _ = sender.closed() => {
                debug!("stream receiver dropped; closing socket");
                let _ = socket.close(None).await;
                return SessionEnd::ReceiverGone;
            }
        };
        let Some(frame) = frame else {
            return SessionEnd::Closed(None);
        };
        let payload = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(error) => {
                    warn!(error = %error, "dropping non UTF-8 binary frame");
                    continue;
                }
            },
            Ok(Message::Close(frame)) => {
                debug!(?frame, "log stream closed by server");
                let reason = frame.map(|close| close.reason.into_owned()).filter(|reason| !reason.is_empty());
                return SessionEnd::Closed(reason);
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => continue,
            Err(error) => {
                warn!(error = %error, "log stream transport error; closing");
                let _ = socket.close(None).await;
                return SessionEnd::Closed(Some(error.to_string()));
            }
        };

        let event = match decode_record(&payload) {
            Ok(record) => StreamEvent::Record(record),
            Err(error) => {
                warn!(error = %error, "skipping malformed log message");
                StreamEvent::Malformed {
                    payload,
                    error: error.to_string(),
                }
            }
        };
        if sender.send(event).await.is_err() {
            let _ = socket.close(None).await;
            return SessionEnd::ReceiverGone;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_record() {
        let payload = r#"{"timestamp":"2024-03-01T10:15:30.5","level":"ERROR","source":"auth-service","message":"Invalid API key provided"}"#;
        let record = decode_record(payload).expect("decode");
        assert_eq!(record.level, "ERROR");
        assert_eq!(record.message, "Invalid API key provided");
    }

    #[test]
    fn rejects_non_record_payloads() {
        assert!(decode_record("ping").is_err());
        assert!(decode_record(r#"{"level":"info"}"#).is_err());
        assert!(decode_record("[]").is_err());
    }
}
