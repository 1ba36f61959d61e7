//! Client session pumps
//!
//! Bridges one bidirectional byte stream to the lobby: a read pump turns
//! incoming lines into lobby events, a write pump drains the client's
//! outbound queue onto the stream. The two pumps never wait on each other.
//!
//! Once the session's shutdown token is cancelled, the write pump gets a
//! short grace period to flush what is queued and is then abandoned, so a
//! peer that stops reading cannot hold the connection open.

use std::time::Duration;

use chrono::Local;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::Client;
use crate::config::Config;
use crate::error::AppError;
use crate::lobby::LobbyEvent;
use crate::message::Message;
use crate::types::ClientId;

/// Time the write pump may keep flushing after shutdown
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Handles to a running session's pumps
#[derive(Debug)]
pub struct Session {
    pub client_id: ClientId,
    pub read_task: JoinHandle<()>,
    pub write_task: JoinHandle<()>,
}

/// Handle a new connection
///
/// Registers the client with the lobby, then starts its read and write
/// pumps. The `Join` event is sent before the read pump exists, so the
/// lobby always sees it ahead of the client's first line.
pub async fn handle_connection<S>(
    stream: S,
    events: mpsc::Sender<LobbyEvent>,
    config: &Config,
) -> Result<Session, AppError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let client_id = ClientId::new();
    let (reader, writer) = tokio::io::split(stream);

    // Lobby -> client lines
    let (line_tx, line_rx) = mpsc::channel::<String>(config.outbound_buffer);
    let shutdown = CancellationToken::new();

    events
        .send(LobbyEvent::Join(Client::new(client_id, line_tx, shutdown.clone())))
        .await
        .map_err(|_| AppError::ChannelSend)?;

    debug!("Client {} registered, starting pumps", client_id);

    let lines = FramedRead::new(
        reader,
        LinesCodec::new_with_max_length(config.max_line_length),
    );
    let sink = FramedWrite::new(writer, LinesCodec::new());

    let write_task = tokio::spawn(write_pump(client_id, sink, line_rx, shutdown.clone()));
    let read_task = tokio::spawn(read_pump(client_id, lines, events, shutdown));

    Ok(Session {
        client_id,
        read_task,
        write_task,
    })
}

/// Stream -> lobby. Always ends by reporting the client's leave and
/// starting the write pump's grace period.
async fn read_pump<R>(
    client_id: ClientId,
    mut lines: FramedRead<R, LinesCodec>,
    events: mpsc::Sender<LobbyEvent>,
    shutdown: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    match read_lines(client_id, &mut lines, &events, &shutdown).await {
        Ok(()) => debug!("Read pump ended for {}", client_id),
        Err(e) => warn!("Read pump failed for {}: {}", client_id, e),
    }

    shutdown.cancel();
    let _ = events.send(LobbyEvent::Leave { client_id }).await;
}

async fn read_lines<R>(
    client_id: ClientId,
    lines: &mut FramedRead<R, LinesCodec>,
    events: &mpsc::Sender<LobbyEvent>,
    shutdown: &CancellationToken,
) -> Result<(), AppError>
where
    R: AsyncRead + Unpin,
{
    loop {
        let next = tokio::select! {
            () = shutdown.cancelled() => {
                debug!("Connection of {} closed by server", client_id);
                return Ok(());
            }
            next = lines.next() => next,
        };

        // None: peer closed the stream
        let Some(text) = next.transpose()? else {
            return Ok(());
        };

        let message = Message::new(Local::now(), client_id, text);
        events
            .send(LobbyEvent::Incoming(message))
            .await
            .map_err(|_| AppError::ChannelSend)?;
    }
}

/// Outbound queue -> stream. Ends when the lobby drops the client, a
/// write fails, or the grace period after shutdown runs out; whatever is
/// still queued is dropped.
async fn write_pump<W>(
    client_id: ClientId,
    mut sink: FramedWrite<W, LinesCodec>,
    mut outbound: mpsc::Receiver<String>,
    shutdown: CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    let result = tokio::select! {
        result = write_lines(&mut sink, &mut outbound) => result,
        () = grace_expired(&shutdown) => {
            debug!("Abandoning unsent lines for {}", client_id);
            Ok(())
        }
    };

    match result {
        Ok(()) => debug!("Write pump ended for {}", client_id),
        Err(e) => warn!("Write pump failed for {}: {}", client_id, e),
    }

    if tokio::time::timeout(CLOSE_GRACE, SinkExt::<String>::close(&mut sink))
        .await
        .is_err()
    {
        debug!("Closing the stream of {} timed out", client_id);
    }
}

async fn grace_expired(shutdown: &CancellationToken) {
    shutdown.cancelled().await;
    tokio::time::sleep(CLOSE_GRACE).await;
}

async fn write_lines<W>(
    sink: &mut FramedWrite<W, LinesCodec>,
    outbound: &mut mpsc::Receiver<String>,
) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = outbound.recv().await {
        // `send` flushes after every line
        sink.send(line).await?;
    }
    Ok(())
}
