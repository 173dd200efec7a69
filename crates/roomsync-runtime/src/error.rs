//! Runtime error taxonomy.
//!
//! Every variant here is recoverable by design: in the default
//! (non-strict) configuration the runtime logs a warning and skips the
//! offending operation, keeping the peer alive. Strict mode surfaces the
//! same conditions as `Err` for earlier failure during development.

use roomsync_transport::TransportError;
use roomsync_wire::PlayerId;

/// Errors surfaced by the runtime's public operations.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// An action was submitted before any action was registered.
    #[error("no actions are registered")]
    NoActionsRegistered,

    /// The submitted action name is not in the registry.
    #[error("unknown action {name:?}")]
    UnknownAction {
        /// The name as submitted.
        name: String,
        /// Closest registered name within edit distance 3, if any.
        suggestion: Option<String>,
    },

    /// A client attempted the host-only direct-state-mutation escape hatch.
    #[error("peer {0} lacks host authority for direct state mutation")]
    NotHost(PlayerId),

    /// `setup` produced no player record for a declared participant.
    #[error("setup produced no {players_key:?} record for player {player}")]
    MissingPlayerRecord {
        /// The configured player-registry key.
        players_key: String,
        /// The player whose record is missing.
        player: PlayerId,
    },

    /// The transport refused or failed a send.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
