//! Error types for the chat server
//!
//! Defines session-level errors, user-visible chat rejections and
//! outbound send errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Session-level errors
///
/// Any of these ends the affected connection; they never reach other
/// clients and never stop the lobby.
#[derive(Debug, Error)]
pub enum AppError {
    /// Line framing error (fatal): invalid UTF-8 or an over-long line
    #[error("Line codec error: {0}")]
    Codec(#[from] tokio_util::codec::LinesCodecError),

    /// Channel send error (fatal - lobby is gone)
    #[error("Lobby channel closed")]
    ChannelSend,
}

/// Chat-level rejections
///
/// The `Display` output of each variant is the exact notice line sent to
/// the offending client. State is left unchanged whenever one is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Roster is at capacity
    #[error("Server is full. Please try reconnecting later.")]
    ServerFull,

    /// Chat content sent while not in a room
    #[error("Error: You cannot send messages in the lobby.")]
    SendInLobby,

    /// `/create` with a name already in use
    #[error("Error: A chat room with that name already exists.")]
    RoomExists,

    /// `/join` with an unknown name
    #[error("Error: A chat room with that name does not exist.")]
    RoomNotFound,

    /// `/leave` while not in a room
    #[error("Error: You cannot leave the lobby.")]
    NotInRoom,

    /// A command that takes a name was given none
    #[error("Error: That command requires a name.")]
    MissingName,
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
