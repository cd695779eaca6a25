//! Websocket subscription to the server event stream.

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::api::ChatEvent;

/// Bound on events waiting for the pipeline; a full queue slows the reader
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How a connected stream stopped forwarding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    Cancelled,
    Disconnected,
    ReceiverGone,
}

/// Handle to the background reader task.
///
/// `is_connected` reports whether the initial connection succeeded. When it
/// did not, no task runs and the bot stays up in a degraded state.
pub struct EventIngest {
    connected: bool,
    task: Option<JoinHandle<()>>,
}

impl EventIngest {
    /// Make one connection attempt and, on success, start forwarding events
    /// into `events` until `cancel` fires.
    pub async fn start(
        url: &str,
        token: &str,
        events: mpsc::Sender<ChatEvent>,
        cancel: CancellationToken,
    ) -> Self {
        match connect(url, token).await {
            Ok(stream) => {
                info!("🔌 Connected to the event stream");
                let task = tokio::spawn(run(
                    url.to_string(),
                    token.to_string(),
                    stream,
                    events,
                    cancel,
                ));
                Self {
                    connected: true,
                    task: Some(task),
                }
            }
            Err(e) => {
                error!("We failed to connect to the web socket: {e:#}");
                error!("The bot will stay online but cannot see new posts");
                Self {
                    connected: false,
                    task: None,
                }
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Wait for the reader task to finish after cancellation
    pub async fn join(self) {
        if let Some(task) = self.task {
            if let Err(e) = task.await {
                warn!("Event stream task ended abnormally: {e}");
            }
        }
    }
}

/// The first frame sent after the upgrade
pub fn authentication_challenge(token: &str, seq: u64) -> String {
    json!({
        "seq": seq,
        "action": "authentication_challenge",
        "data": { "token": token },
    })
    .to_string()
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

async fn connect(url: &str, token: &str) -> Result<WsStream> {
    let mut request = url
        .into_client_request()
        .with_context(|| format!("invalid event stream url '{url}'"))?;
    request.headers_mut().insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}"))
            .context("bot token is not a valid header value")?,
    );

    let (mut stream, _response) = connect_async(request)
        .await
        .context("websocket handshake failed")?;
    stream
        .send(Message::Text(authentication_challenge(token, 1).into()))
        .await
        .context("failed to send authentication challenge")?;
    Ok(stream)
}

/// Forward from `first`, then keep reconnecting with capped backoff until
/// cancelled or the pipeline goes away.
async fn run(
    url: String,
    token: String,
    first: WsStream,
    events: mpsc::Sender<ChatEvent>,
    cancel: CancellationToken,
) {
    let mut stream = Some(first);
    let mut backoff = INITIAL_BACKOFF;

    loop {
        if let Some(connected) = stream.take() {
            match forward(connected, &events, &cancel).await {
                StreamEnd::Cancelled => {
                    info!("Event stream closed");
                    return;
                }
                StreamEnd::ReceiverGone => {
                    debug!("Event pipeline closed, stopping the reader");
                    return;
                }
                StreamEnd::Disconnected => warn!("Event stream disconnected"),
            }
        }

        info!("Reconnecting to the event stream in {}s", backoff.as_secs());
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(backoff) => {}
        }

        match connect(&url, &token).await {
            Ok(reconnected) => {
                info!("🔌 Reconnected to the event stream");
                stream = Some(reconnected);
                backoff = INITIAL_BACKOFF;
            }
            Err(e) => {
                warn!("Reconnect failed: {e:#}");
                backoff = next_backoff(backoff);
            }
        }
    }
}

async fn forward(
    stream: WsStream,
    events: &mpsc::Sender<ChatEvent>,
    cancel: &CancellationToken,
) -> StreamEnd {
    let (mut sink, mut reader) = stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                if let Err(e) = sink.close().await {
                    debug!("Close handshake failed: {e}");
                }
                return StreamEnd::Cancelled;
            }
            frame = reader.next() => match frame {
                Some(Ok(Message::Text(text))) => match ChatEvent::parse(text.as_str()) {
                    Some(event) => {
                        if events.send(event).await.is_err() {
                            return StreamEnd::ReceiverGone;
                        }
                    }
                    None => debug!("Ignoring non-event frame: {}", text.as_str()),
                },
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = sink.send(Message::Pong(data)).await {
                        warn!("Failed to answer ping: {e}");
                        return StreamEnd::Disconnected;
                    }
                }
                Some(Ok(Message::Close(_))) | None => return StreamEnd::Disconnected,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Event stream error: {e}");
                    return StreamEnd::Disconnected;
                }
            },
        }
    }
}
