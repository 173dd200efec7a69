//! In-process transport: a hub of per-peer inboxes.
//!
//! The first peer to join becomes host; if the host leaves, the earliest
//! remaining joiner inherits the role. Messages are FIFO per peer and pass
//! through [`roomsync_wire::encode_message`] / [`decode_message`] so the
//! codec path is identical to a network transport's.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::warn;

use roomsync_wire::{decode_message, encode_message, Delivery, PlayerId, WireMessage};

use crate::{Transport, TransportError, TransportEvent};

enum Inbound {
    Frame(Vec<u8>),
    Joined(PlayerId),
    Left(PlayerId),
}

struct HubInner {
    /// Inbox sender per connected peer.
    peers: HashMap<PlayerId, Sender<Inbound>>,
    /// Join order; the front peer is the host.
    order: Vec<PlayerId>,
}

impl HubInner {
    fn host(&self) -> Option<&PlayerId> {
        self.order.first()
    }
}

/// Shared in-process hub that peers join and leave.
#[derive(Clone)]
pub struct MemoryHub {
    inner: Arc<Mutex<HubInner>>,
}

impl MemoryHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                peers: HashMap::new(),
                order: Vec::new(),
            })),
        }
    }

    /// Connect a new peer. Every already-connected peer observes a
    /// `PeerJoined` event; the joiner observes nothing retroactively and
    /// learns existing peers through [`Transport::peer_ids`].
    pub fn join(&self, id: impl Into<PlayerId>) -> Result<MemoryTransport, TransportError> {
        let id = id.into();
        let (tx, rx) = unbounded();

        let mut inner = self.lock();
        if inner.peers.contains_key(&id) {
            return Err(TransportError::AlreadyJoined(id));
        }
        for (peer, inbox) in &inner.peers {
            if inbox.send(Inbound::Joined(id.clone())).is_err() {
                warn!(peer = %peer, "dropping join notification: inbox closed");
            }
        }
        inner.peers.insert(id.clone(), tx);
        inner.order.push(id.clone());
        drop(inner);

        Ok(MemoryTransport {
            hub: self.clone(),
            id,
            inbox: rx,
            connected: true,
        })
    }

    /// Ids of all connected peers, in join order.
    pub fn peer_ids(&self) -> Vec<PlayerId> {
        self.lock().order.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubInner> {
        // A poisoned hub lock means a peer panicked mid-send; the registry
        // itself is still a plain map, so continue with the inner value.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn disconnect(&self, id: &PlayerId) {
        let mut inner = self.lock();
        if inner.peers.remove(id).is_none() {
            return;
        }
        inner.order.retain(|peer| peer != id);
        for (peer, inbox) in &inner.peers {
            if inbox.send(Inbound::Left(id.clone())).is_err() {
                warn!(peer = %peer, "dropping leave notification: inbox closed");
            }
        }
    }
}

impl Default for MemoryHub {
    fn default() -> Self {
        Self::new()
    }
}

/// One peer's connection to a [`MemoryHub`].
pub struct MemoryTransport {
    hub: MemoryHub,
    id: PlayerId,
    inbox: Receiver<Inbound>,
    connected: bool,
}

impl MemoryTransport {
    /// Disconnect from the hub. Idempotent; also runs on drop.
    pub fn leave(&mut self) {
        if self.connected {
            self.connected = false;
            self.hub.disconnect(&self.id);
        }
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.leave();
    }
}

impl Transport for MemoryTransport {
    fn send(
        &mut self,
        message: &WireMessage,
        target: Option<&PlayerId>,
    ) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::Disconnected);
        }
        let frame = encode_message(&Delivery {
            sender: self.id.clone(),
            timestamp_ms: Some(now_ms()),
            message: message.clone(),
        })?;

        let inner = self.hub.lock();
        match target {
            Some(target) => {
                let inbox = inner
                    .peers
                    .get(target)
                    .ok_or_else(|| TransportError::UnknownPeer(target.clone()))?;
                if inbox.send(Inbound::Frame(frame)).is_err() {
                    warn!(peer = %target, "dropping frame: inbox closed");
                }
            }
            None => {
                for (peer, inbox) in &inner.peers {
                    if peer == &self.id {
                        continue;
                    }
                    if inbox.send(Inbound::Frame(frame.clone())).is_err() {
                        warn!(peer = %peer, "dropping frame: inbox closed");
                    }
                }
            }
        }
        Ok(())
    }

    fn poll(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        for inbound in self.inbox.try_iter() {
            match inbound {
                Inbound::Frame(frame) => match decode_message(&frame) {
                    Ok(delivery) => events.push(TransportEvent::Message(delivery)),
                    Err(err) => warn!(error = %err, "discarding undecodable frame"),
                },
                Inbound::Joined(id) => events.push(TransportEvent::PeerJoined(id)),
                Inbound::Left(id) => events.push(TransportEvent::PeerLeft(id)),
            }
        }
        events
    }

    fn local_id(&self) -> &PlayerId {
        &self.id
    }

    fn peer_ids(&self) -> Vec<PlayerId> {
        self.hub.peer_ids()
    }

    fn is_host(&self) -> bool {
        self.hub.lock().host() == Some(&self.id)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use roomsync_wire::{EventEnvelope, StateSync};

    fn event_msg(name: &str) -> WireMessage {
        WireMessage::Event(EventEnvelope {
            event_name: name.to_string(),
            payload: json!(null),
        })
    }

    #[test]
    fn first_joiner_is_host_and_role_passes_on_leave() {
        let hub = MemoryHub::new();
        let mut a = hub.join("a").unwrap();
        let b = hub.join("b").unwrap();

        assert!(a.is_host());
        assert!(!b.is_host());

        a.leave();
        assert!(b.is_host());
    }

    #[test]
    fn duplicate_peer_id_rejected() {
        let hub = MemoryHub::new();
        let _a = hub.join("a").unwrap();
        assert!(matches!(
            hub.join("a"),
            Err(TransportError::AlreadyJoined(_))
        ));
    }

    #[test]
    fn broadcast_reaches_everyone_but_the_sender() {
        let hub = MemoryHub::new();
        let mut a = hub.join("a").unwrap();
        let mut b = hub.join("b").unwrap();
        let mut c = hub.join("c").unwrap();

        // Drain join notifications first.
        a.poll();
        b.poll();

        a.send(&event_msg("ping"), None).unwrap();

        assert!(a.poll().is_empty(), "sender must not hear its own broadcast");
        for peer in [&mut b, &mut c] {
            let events = peer.poll();
            assert_eq!(events.len(), 1);
            match &events[0] {
                TransportEvent::Message(delivery) => {
                    assert_eq!(delivery.sender, PlayerId::from("a"));
                    assert!(delivery.timestamp_ms.is_some());
                }
                other => panic!("expected message, got {other:?}"),
            }
        }
    }

    #[test]
    fn targeted_send_reaches_only_the_target() {
        let hub = MemoryHub::new();
        let mut a = hub.join("a").unwrap();
        let mut b = hub.join("b").unwrap();
        let mut c = hub.join("c").unwrap();
        a.poll();
        b.poll();

        let snapshot = WireMessage::StateSync(StateSync::Full {
            state: json!({"players": {}}),
        });
        a.send(&snapshot, Some(&PlayerId::from("c"))).unwrap();

        assert!(b.poll().is_empty());
        let events = c.poll();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], TransportEvent::Message(_)));
    }

    #[test]
    fn targeted_send_to_unknown_peer_errors() {
        let hub = MemoryHub::new();
        let mut a = hub.join("a").unwrap();
        let err = a
            .send(&event_msg("x"), Some(&PlayerId::from("ghost")))
            .unwrap_err();
        assert!(matches!(err, TransportError::UnknownPeer(_)));
    }

    #[test]
    fn join_and_leave_events_observed_by_existing_peers() {
        let hub = MemoryHub::new();
        let mut a = hub.join("a").unwrap();
        {
            let _b = hub.join("b").unwrap();
            let events = a.poll();
            assert!(
                matches!(&events[..], [TransportEvent::PeerJoined(id)] if id.as_str() == "b")
            );
            // _b drops here → leave.
        }
        let events = a.poll();
        assert!(matches!(&events[..], [TransportEvent::PeerLeft(id)] if id.as_str() == "b"));
    }

    #[test]
    fn messages_are_fifo_per_peer() {
        let hub = MemoryHub::new();
        let mut a = hub.join("a").unwrap();
        let mut b = hub.join("b").unwrap();
        a.poll();

        for i in 0..10 {
            a.send(&event_msg(&format!("e{i}")), None).unwrap();
        }
        let names: Vec<String> = b
            .poll()
            .into_iter()
            .filter_map(|event| match event {
                TransportEvent::Message(delivery) => match delivery.message {
                    WireMessage::Event(envelope) => Some(envelope.event_name),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(names, (0..10).map(|i| format!("e{i}")).collect::<Vec<_>>());
    }

    #[test]
    fn send_after_leave_is_disconnected() {
        let hub = MemoryHub::new();
        let mut a = hub.join("a").unwrap();
        a.leave();
        assert!(matches!(
            a.send(&event_msg("x"), None),
            Err(TransportError::Disconnected)
        ));
        // leave is idempotent
        a.leave();
    }
}
