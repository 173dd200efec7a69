//! Wire message types and serialization for peer communication.
//!
//! Every message is serialized as a JSON body prefixed with a protocol
//! version byte. JSON rather than a binary codec because payloads embed
//! arbitrary `serde_json::Value` state trees, which require a
//! self-describing format to deserialize. Use [`encode_message`] and
//! [`decode_message`] for encoding/decoding.

pub mod message;
pub mod types;

pub use message::{
    ActionContextWire, ActionEnvelope, EventEnvelope, StateSync, WireMessage,
};
pub use types::PlayerId;

use serde::{Deserialize, Serialize};

/// Current wire-protocol version. Prepended to every serialized message.
pub const PROTOCOL_VERSION: u8 = 1;

/// Errors that can occur during message decoding.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The payload was empty (no version byte).
    #[error("empty payload: no version byte")]
    EmptyPayload,

    /// The version byte does not match [`PROTOCOL_VERSION`].
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// JSON (de)serialization failed.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// A message as delivered to a peer: the body plus who sent it and when.
///
/// Transports stamp `sender` and `timestamp_ms`; the body is opaque to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    /// Peer that sent the message.
    pub sender: PlayerId,
    /// Wall-clock milliseconds at send time, if the transport provides it.
    pub timestamp_ms: Option<u64>,
    /// The message body.
    pub message: WireMessage,
}

/// Serialize a [`Delivery`] into a versioned binary payload.
///
/// Wire format: `[version: u8] [JSON-encoded Delivery]`
pub fn encode_message(delivery: &Delivery) -> Result<Vec<u8>, MessageError> {
    let body = serde_json::to_vec(delivery)?;
    let mut out = Vec::with_capacity(1 + body.len());
    out.push(PROTOCOL_VERSION);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Deserialize a versioned binary payload into a [`Delivery`].
///
/// Returns an error if the version is unsupported or the body is malformed.
pub fn decode_message(data: &[u8]) -> Result<Delivery, MessageError> {
    if data.is_empty() {
        return Err(MessageError::EmptyPayload);
    }
    let version = data[0];
    if version != PROTOCOL_VERSION {
        return Err(MessageError::UnsupportedVersion(version));
    }
    Ok(serde_json::from_slice(&data[1..])?)
}
