use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::client::{EventTx, SessionEvent};
use crate::error::SessionError;

/// Identifies one physical socket. Events from a socket that has since been
/// replaced carry an old id and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Raw socket lifecycle, in browser-socket terms.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    Error(String),
    Closed(Option<String>),
}

/// Opens sockets. Implementations must report every outcome, including a
/// failed handshake, as `TransportEvent`s on `events`.
pub trait Connector: Send {
    fn open(&mut self, id: ConnectionId, url: &str, events: EventTx) -> Box<dyn Link>;
}

/// The sending half of an open (or opening) socket.
pub trait Link: Send {
    /// Queue a text frame. Never blocks.
    fn send(&mut self, frame: String) -> Result<(), SessionError>;

    /// Start a graceful close.
    fn close(&mut self);
}

fn post(events: &EventTx, id: ConnectionId, event: TransportEvent) {
    if events.send(SessionEvent::Transport { id, event }).is_err() {
        tracing::debug!("session gone, dropping transport event for {:?}", id);
    }
}

/// `tokio-tungstenite` backed connector.
pub struct WsConnector {
    capacity: usize,
}

impl WsConnector {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl Connector for WsConnector {
    fn open(&mut self, id: ConnectionId, url: &str, events: EventTx) -> Box<dyn Link> {
        let (out_tx, mut out_rx) = mpsc::channel::<Message>(self.capacity);
        let url = url.to_string();

        let reader = tokio::spawn(async move {
            let ws_stream = match tokio_tungstenite::connect_async(url.as_str()).await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    tracing::error!("failed to connect to {}: {}", url, e);
                    post(&events, id, TransportEvent::Error(e.to_string()));
                    post(&events, id, TransportEvent::Closed(None));
                    return;
                }
            };
            tracing::info!("connected to {}", url);
            post(&events, id, TransportEvent::Opened);

            let (mut write, mut read) = ws_stream.split();

            // Drains queued frames until the link is dropped or asks to close.
            tokio::spawn(async move {
                while let Some(message) = out_rx.recv().await {
                    let closing = message.is_close();
                    if let Err(e) = write.send(message).await {
                        tracing::error!("failed to send message: {}", e);
                        break;
                    }
                    if closing {
                        break;
                    }
                }
            });

            while let Some(message) = read.next().await {
                let message = match message {
                    Err(e) => {
                        tracing::error!("failed to read message: {}", e);
                        post(&events, id, TransportEvent::Error(e.to_string()));
                        break;
                    }
                    Ok(message) => message,
                };
                match message {
                    Message::Text(text) => {
                        tracing::debug!("received frame ({} bytes)", text.len());
                        post(&events, id, TransportEvent::Frame(text));
                    }
                    Message::Binary(bin) => {
                        tracing::warn!("unexpected binary message: {} bytes", bin.len());
                    }
                    Message::Close(reason) => {
                        tracing::info!("connection closed: {:?}", reason);
                        post(
                            &events,
                            id,
                            TransportEvent::Closed(reason.map(|frame| frame.reason.to_string())),
                        );
                        return;
                    }
                    _ => {}
                }
            }
            post(&events, id, TransportEvent::Closed(None));
        });

        Box::new(WsLink { out_tx, reader })
    }
}

struct WsLink {
    out_tx: mpsc::Sender<Message>,
    reader: JoinHandle<()>,
}

impl Link for WsLink {
    fn send(&mut self, frame: String) -> Result<(), SessionError> {
        self.out_tx
            .try_send(Message::Text(frame))
            .map_err(|e| SessionError::TransportError(e.to_string()))
    }

    fn close(&mut self) {
        if let Err(e) = self.out_tx.try_send(Message::Close(None)) {
            tracing::debug!("close frame not queued: {}", e);
        }
    }
}

impl Drop for WsLink {
    fn drop(&mut self) {
        // The writer finishes on its own once `out_tx` is gone.
        self.reader.abort();
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use tokio_tungstenite::tungstenite::Message;

    use super::*;

    async fn next_event(
        rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
    ) -> (ConnectionId, TransportEvent) {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for transport event")
            .expect("event queue closed");
        match event {
            SessionEvent::Transport { id, event } => (id, event),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refused_handshake_reports_error_then_close() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut connector = WsConnector::new(8);
        let id = ConnectionId::new(1);
        let _link = connector.open(id, "ws://127.0.0.1:9", tx);

        let (first_id, first) = next_event(&mut rx).await;
        assert_eq!(first_id, id);
        assert!(matches!(first, TransportEvent::Error(_)), "got {first:?}");
        assert_eq!(next_event(&mut rx).await, (id, TransportEvent::Closed(None)));
    }

    #[tokio::test]
    async fn test_frames_in_and_out_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text(r#"{"type":"message","content":"q"}"#.to_string()))
                .await
                .unwrap();

            let mut seen = vec![];
            while let Some(Ok(message)) = ws.next().await {
                let closing = message.is_close();
                seen.push(message);
                if closing {
                    break;
                }
            }
            seen
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut connector = WsConnector::new(8);
        let id = ConnectionId::new(7);
        let mut link = connector.open(id, &format!("ws://{addr}"), tx);

        assert_eq!(next_event(&mut rx).await, (id, TransportEvent::Opened));
        assert_eq!(
            next_event(&mut rx).await,
            (
                id,
                TransportEvent::Frame(r#"{"type":"message","content":"q"}"#.to_string())
            )
        );

        link.send("hello".to_string()).unwrap();
        link.close();

        let seen = server.await.unwrap();
        assert_eq!(
            seen,
            vec![Message::Text("hello".to_string()), Message::Close(None)]
        );
    }
}
