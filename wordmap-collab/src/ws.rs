//! WebSocket transport (tokio-tungstenite).
//!
//! The host *is* the service: `bind` opens a TCP listener on the
//! configured host/port and accepts WebSocket upgrades whose request path
//! names the bound address (`/<room-code>` under the configured path).
//! Requests for any other path are refused during the handshake, which
//! the dialing side observes as a server rejection.
//!
//! Error classification:
//! - listener address in use      → `AddressUnavailable` (fatal, no retry)
//! - I/O failures either side    → `Network` (host side: one fallback)
//! - handshake rejected by host  → `ServerError`
//! - anything else               → `Other`

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use uuid::Uuid;

use crate::transport::{
    Channel, ChannelEvent, Endpoint, EndpointEvent, Transport, TransportConfig, TransportError,
};

const PIPE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

impl WsTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn bind(
        &self,
        address: &str,
        config: &TransportConfig,
    ) -> Result<Endpoint, TransportError> {
        let listen_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&listen_addr).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                TransportError::AddressUnavailable(format!("{listen_addr}: {e}"))
            } else {
                TransportError::Network(format!("{listen_addr}: {e}"))
            }
        })?;
        log::info!("listening on {listen_addr} for room {address}");

        let (incoming_tx, incoming_rx) = mpsc::channel(PIPE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(accept_loop(
            listener,
            incoming_tx,
            shutdown_rx,
            config.route(address),
        ));

        Ok(Endpoint::new(address.to_string(), incoming_rx, shutdown_tx))
    }

    async fn connect(
        &self,
        address: &str,
        config: &TransportConfig,
    ) -> Result<Channel, TransportError> {
        let url = config.url_for(address);
        log::debug!("dialing {url}");
        let (ws, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(classify_connect_error)?;
        Ok(spawn_ws_channel(ws))
    }
}

fn classify_connect_error(error: tokio_tungstenite::tungstenite::Error) -> TransportError {
    use tokio_tungstenite::tungstenite::Error as WsError;
    match error {
        WsError::Io(io) => TransportError::Network(io.to_string()),
        WsError::Http(response) => {
            TransportError::ServerError(format!("handshake rejected: {}", response.status()))
        }
        other => TransportError::Other(other.to_string()),
    }
}

async fn accept_loop(
    listener: TcpListener,
    incoming_tx: mpsc::Sender<EndpointEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
    expected_path: String,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,

            accepted = listener.accept() => {
                let (stream, remote) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        log::warn!("accept failed: {e}");
                        let _ = incoming_tx.send(EndpointEvent::Closed).await;
                        break;
                    }
                };
                log::debug!("TCP connection from {remote}");

                let tx = incoming_tx.clone();
                let expected = expected_path.clone();
                tokio::spawn(async move {
                    let check = |request: &Request, response: Response| {
                        if request.uri().path() == expected {
                            Ok(response)
                        } else {
                            log::warn!(
                                "refusing connection from {remote} for unknown path {}",
                                request.uri().path()
                            );
                            let mut refusal = ErrorResponse::new(Some("unknown room".into()));
                            *refusal.status_mut() = StatusCode::NOT_FOUND;
                            Err(refusal)
                        }
                    };
                    match tokio_tungstenite::accept_hdr_async(stream, check).await {
                        Ok(ws) => {
                            let channel = spawn_ws_channel(ws);
                            let _ = tx.send(EndpointEvent::Incoming(channel)).await;
                        }
                        Err(e) => log::debug!("handshake with {remote} failed: {e}"),
                    }
                });
            }
        }
    }
    log::debug!("accept loop for {expected_path} stopped");
}

/// Wrap an established WebSocket into the transport's channel shape:
/// a writer task drains the outgoing queue, a reader task translates
/// frames into [`ChannelEvent`]s (starting with `Open`).
fn spawn_ws_channel<S>(ws: WebSocketStream<S>) -> Channel
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sink, mut stream) = ws.split();
    let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Vec<u8>>(PIPE_CAPACITY);
    let (events_tx, events_rx) = mpsc::channel(PIPE_CAPACITY);
    let id = Uuid::new_v4();

    tokio::spawn(async move {
        while let Some(data) = outgoing_rx.recv().await {
            if sink.send(Message::Binary(data.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    tokio::spawn(async move {
        if events_tx.send(ChannelEvent::Open).await.is_err() {
            return;
        }
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Binary(data)) => {
                    let bytes: Vec<u8> = data.into();
                    if events_tx.send(ChannelEvent::Data(bytes)).await.is_err() {
                        return;
                    }
                }
                Ok(Message::Text(text)) => {
                    let bytes = text.as_bytes().to_vec();
                    if events_tx.send(ChannelEvent::Data(bytes)).await.is_err() {
                        return;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {} // ping/pong handled by the library
                Err(e) => {
                    let _ = events_tx
                        .send(ChannelEvent::Error(TransportError::Network(e.to_string())))
                        .await;
                    return;
                }
            }
        }
        let _ = events_tx.send(ChannelEvent::Closed).await;
    });

    Channel::new(id, outgoing_tx, events_rx)
}
