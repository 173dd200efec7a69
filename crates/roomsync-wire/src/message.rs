//! Peer-to-peer message bodies. The enum discriminant is the type tag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use roomsync_patch::PatchOp;

use crate::types::PlayerId;

/// Top-level message exchanged between peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    /// A submitted action, carrying its deterministic replay seed.
    Action(ActionEnvelope),

    /// Host-to-client state synchronization (full snapshot or patch list).
    StateSync(StateSync),

    /// Fire-and-forget application event, independent of state.
    Event(EventEnvelope),

    /// A peer joined the session.
    PlayerJoin {
        /// The joining peer.
        player_id: PlayerId,
    },

    /// A peer left the session.
    PlayerLeave {
        /// The departing peer.
        player_id: PlayerId,
    },

    /// Liveness probe. The runtime ignores these; transports may use them.
    Heartbeat {
        /// Sender wall-clock milliseconds.
        timestamp_ms: u64,
    },

    /// A peer nominating itself (or another) as replacement host.
    /// Host election is a transport-layer negotiation; the runtime only
    /// carries the variant.
    HostElectionRequest {
        /// The nominated peer.
        candidate: PlayerId,
    },

    /// Outcome of a host election.
    HostElectionResponse {
        /// The agreed-upon host.
        host: PlayerId,
    },
}

/// The caller/target/authority triple an action was built with.
///
/// Travels verbatim on the wire so the host replays a client action with
/// exactly the context the client constructed, not a re-derived one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionContextWire {
    /// Peer that submitted the action.
    pub caller: PlayerId,
    /// Peer whose data the action targets (defaults to the caller).
    pub target: PlayerId,
    /// Whether the submitting peer held host authority.
    pub is_host: bool,
}

/// An action submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    /// Registered name of the action.
    pub action_name: String,
    /// Author-defined input value.
    pub input: Value,
    /// The invocation context as built by the submitter.
    pub context: ActionContextWire,
    /// Seed for the action's random source. Must be used verbatim by the
    /// replaying peer so both sides draw the identical sequence.
    pub action_seed: u64,
}

/// State synchronization payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateSync {
    /// Wholesale replacement, sent to peers with no prior state to patch
    /// (e.g. a fresh joiner).
    Full {
        /// The complete canonical state tree.
        state: Value,
    },
    /// Incremental update relative to the receiver's current mirror.
    Patches {
        /// Ordered edit script.
        patches: Vec<PatchOp>,
    },
}

/// A broadcast application event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Author-defined event name.
    pub event_name: String,
    /// Opaque payload.
    pub payload: Value,
}
