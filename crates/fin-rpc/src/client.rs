//! RPC client for the result provider.
//!
//! One background task owns the read half of the socket and routes each
//! response to the request awaiting it; writes go through a shared sink.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::UnixStream;
use tokio::sync::{Mutex, oneshot};
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::protocol::{Message, Notification, Request, RequestId, Response, RpcError};
use crate::transport::{CodecError, JsonRpcCodec};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Get the socket path the provider listens on.
///
/// Prefers `$XDG_RUNTIME_DIR`, falling back to the system temp directory.
#[must_use]
pub fn socket_path() -> PathBuf {
    std::env::var("XDG_RUNTIME_DIR")
        .map_or_else(|_| std::env::temp_dir(), PathBuf::from)
        .join("fin.sock")
}

/// Errors that can occur with the RPC client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC error: {code} - {message}")]
    Rpc { code: i32, message: String },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Request timeout")]
    Timeout,

    #[error("Unexpected response type")]
    UnexpectedResponse,
}

impl ClientError {
    /// Whether the connection this error came from can no longer be used.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionClosed | ClientError::Io(_) | ClientError::Codec(_)
        )
    }
}

impl From<RpcError> for ClientError {
    fn from(e: RpcError) -> Self {
        ClientError::Rpc {
            code: e.code,
            message: e.message,
        }
    }
}

type PendingMap = HashMap<RequestId, oneshot::Sender<Result<Response, ClientError>>>;
type Sink = SplitSink<Framed<UnixStream, JsonRpcCodec>, Message>;

/// JSON-RPC client over a Unix socket
pub struct RpcClient {
    sink: Mutex<Sink>,
    pending: Arc<Mutex<PendingMap>>,
    closed: Arc<AtomicBool>,
    next_id: AtomicU64,
    timeout: Duration,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("timeout", &self.timeout)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl RpcClient {
    /// Connect to the provider at the default socket path.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the socket connection fails.
    pub async fn connect() -> Result<Self, ClientError> {
        Self::connect_to(&socket_path()).await
    }

    /// Connect to the provider at a custom socket path.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the socket connection fails.
    pub async fn connect_to(path: &Path) -> Result<Self, ClientError> {
        let stream = UnixStream::connect(path).await?;
        let (sink, mut stream) = Framed::new(stream, JsonRpcCodec::new()).split();

        let pending: Arc<Mutex<PendingMap>> = Arc::new(Mutex::new(HashMap::new()));
        let reader_pending = Arc::clone(&pending);
        let closed = Arc::new(AtomicBool::new(false));
        let reader_closed = Arc::clone(&closed);

        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Response(resp)) => {
                        if let Some(tx) = reader_pending.lock().await.remove(&resp.id) {
                            let _ = tx.send(Ok(resp));
                        } else {
                            debug!("Dropping response for unknown request {}", resp.id);
                        }
                    }
                    Ok(other) => {
                        debug!("Ignoring unsolicited message: {:?}", other.method());
                    }
                    Err(e) => {
                        warn!("Provider stream error: {e}");
                        break;
                    }
                }
            }

            // Set under the lock so a request either sees the flag or is drained
            let mut pending = reader_pending.lock().await;
            reader_closed.store(true, Ordering::Release);
            for (_, tx) in pending.drain() {
                let _ = tx.send(Err(ClientError::ConnectionClosed));
            }
            debug!("Provider connection reader stopped");
        });

        Ok(Self {
            sink: Mutex::new(sink),
            pending,
            closed,
            next_id: AtomicU64::new(1),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the reader has stopped. A closed client fails every call.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Send a request and wait for its response.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails, the connection closes, the provider
    /// answers with an error object, or the result does not deserialize into `T`.
    pub async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if self.is_closed() {
                return Err(ClientError::ConnectionClosed);
            }
            pending.insert(id.clone(), tx);
        }

        let sent = self
            .sink
            .lock()
            .await
            .send(Message::Request(Request::new(method, params, id.clone())))
            .await;
        if let Err(e) = sent {
            self.pending.lock().await.remove(&id);
            return Err(e.into());
        }

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => response?,
            Ok(Err(_)) => return Err(ClientError::ConnectionClosed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(ClientError::Timeout);
            }
        };

        if let Some(error) = response.error {
            return Err(error.into());
        }

        let result = response.result.ok_or(ClientError::UnexpectedResponse)?;
        Ok(serde_json::from_value(result)?)
    }

    /// Send a notification (no response expected).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::ConnectionClosed` once the reader has stopped, or
    /// `ClientError::Codec` if sending fails.
    pub async fn notify(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), ClientError> {
        if self.is_closed() {
            return Err(ClientError::ConnectionClosed);
        }
        self.sink
            .lock()
            .await
            .send(Message::Notification(Notification::new(method, params)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_path() {
        assert!(socket_path().ends_with("fin.sock"));
    }

    #[test]
    fn test_client_error_from_rpc_error() {
        let err: ClientError = RpcError::method_not_found().into();
        match err {
            ClientError::Rpc { code, message } => {
                assert_eq!(code, crate::protocol::METHOD_NOT_FOUND);
                assert!(message.contains("not found"));
            }
            _ => panic!("Expected Rpc error"),
        }
    }

    #[test]
    fn test_client_error_display() {
        assert_eq!(ClientError::ConnectionClosed.to_string(), "Connection closed");
        assert_eq!(ClientError::Timeout.to_string(), "Request timeout");
        assert_eq!(
            ClientError::UnexpectedResponse.to_string(),
            "Unexpected response type"
        );
    }

    #[test]
    fn test_disconnect_classification() {
        assert!(ClientError::ConnectionClosed.is_disconnect());
        assert!(ClientError::Codec(CodecError::FrameTooLarge(1)).is_disconnect());
        assert!(!ClientError::Timeout.is_disconnect());
        assert!(!ClientError::from(RpcError::internal_error("busy")).is_disconnect());
    }

    #[tokio::test]
    async fn test_connect_to_missing_socket_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = RpcClient::connect_to(&dir.path().join("absent.sock"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
