//! The transport boundary: message delivery and peer lifecycle.
//!
//! The runtime consumes the [`Transport`] trait and never cares how bytes
//! move. Network transports (WebRTC mesh, iframe bridge, sockets) live
//! outside this repository; the in-process [`MemoryHub`] here exists so the
//! engine can be exercised end to end. It still round-trips every message
//! through the real versioned codec, so tests cover the same path a network
//! transport would.

pub mod memory;

pub use memory::{MemoryHub, MemoryTransport};

use roomsync_wire::{Delivery, MessageError, PlayerId, WireMessage};

/// Errors surfaced by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A targeted send named a peer the transport does not know.
    #[error("unknown peer {0}")]
    UnknownPeer(PlayerId),

    /// A peer id was already taken when joining.
    #[error("peer id {0} is already connected")]
    AlreadyJoined(PlayerId),

    /// The local peer is no longer connected.
    #[error("transport is disconnected")]
    Disconnected,

    /// Message encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] MessageError),
}

/// Something that happened on the wire since the last poll.
#[derive(Debug)]
pub enum TransportEvent {
    /// A message arrived from another peer.
    Message(Delivery),
    /// A peer joined the session.
    PeerJoined(PlayerId),
    /// A peer left the session.
    PeerLeft(PlayerId),
}

/// Message-delivery boundary consumed by the runtime.
///
/// Delivery semantics are whatever the implementation provides: no ordering
/// or reliability guarantee is added at this layer, and nothing is retried.
pub trait Transport {
    /// Send `message` to `target`, or to every other peer when `target` is
    /// `None`. The local peer never receives its own broadcasts.
    fn send(
        &mut self,
        message: &WireMessage,
        target: Option<&PlayerId>,
    ) -> Result<(), TransportError>;

    /// Drain everything that arrived since the last poll, in delivery order.
    fn poll(&mut self) -> Vec<TransportEvent>;

    /// The local peer's id.
    fn local_id(&self) -> &PlayerId;

    /// Ids of all currently connected peers, local peer included.
    fn peer_ids(&self) -> Vec<PlayerId>;

    /// Whether the local peer currently holds host authority.
    fn is_host(&self) -> bool;
}
