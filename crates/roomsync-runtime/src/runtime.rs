//! The orchestrating runtime: canonical state ownership, action routing,
//! periodic sync broadcast, and player lifecycle.
//!
//! One logical thread of control per peer: all mutation of canonical
//! state, the last-broadcast snapshot, and subscriber lists happens inside
//! [`Runtime::tick`] and the public API calls, never concurrently. The
//! transport is drained by polling, so suspension points exist only at
//! that boundary.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, trace, warn};

use roomsync_patch::{apply_patch, diff};
use roomsync_rng::GameRng;
use roomsync_transport::{Transport, TransportEvent};
use roomsync_wire::{
    ActionContextWire, ActionEnvelope, EventEnvelope, PlayerId, StateSync, WireMessage,
};

use crate::actions::{next_action_seed, ActionContext, ActionLookup, ActionRegistry};
use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::hooks::{GameHooks, SetupContext, SETUP_SEED};
use crate::schedule::SyncSchedule;
use crate::subscribers::{Callbacks, Subscription};

type StateCallback = dyn FnMut(&Value);
type EventCallback = dyn FnMut(&PlayerId, &Value);

/// Host-authoritative state-synchronization runtime over a [`Transport`].
///
/// On the host, canonical state is mutated by actions and the escape
/// hatch, and every sync interval a minimal diff against the last
/// broadcast is shipped to all peers. On a client, local state is a
/// read-only mirror that only inbound `state_sync` messages may overwrite.
pub struct Runtime<T: Transport> {
    config: RuntimeConfig,
    transport: T,
    local_id: PlayerId,
    hooks: GameHooks,
    registry: ActionRegistry,
    state: Value,
    last_broadcast: Value,
    schedule: SyncSchedule,
    state_subscribers: Callbacks<StateCallback>,
    event_listeners: HashMap<String, Callbacks<EventCallback>>,
    destroyed: bool,
}

impl<T: Transport> Runtime<T> {
    /// Construct a runtime: runs the `setup` hook with the fixed setup
    /// seed, validates the player registry, and snapshots the
    /// last-broadcast baseline.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::MissingPlayerRecord`] when `strict_player_init` is
    /// set and `setup` omitted a declared player.
    pub fn new(config: RuntimeConfig, mut hooks: GameHooks, transport: T) -> Result<Self, RuntimeError> {
        let local_id = transport.local_id().clone();

        let mut random = GameRng::new(SETUP_SEED);
        let mut setup_ctx = SetupContext {
            player_ids: &config.player_ids,
            random: &mut random,
        };
        let state = (hooks.setup)(&mut setup_ctx);

        validate_player_records(&state, &config)?;

        let last_broadcast = state.clone();
        let schedule = SyncSchedule::new(config.sync_interval_ms);

        Ok(Self {
            config,
            transport,
            local_id,
            hooks,
            registry: ActionRegistry::new(),
            state,
            last_broadcast,
            schedule,
            state_subscribers: Callbacks::new(),
            event_listeners: HashMap::new(),
            destroyed: false,
        })
    }

    /// Register an action mutator under `name`.
    pub fn register_action(
        &mut self,
        name: impl Into<String>,
        action: impl FnMut(&mut Value, &mut ActionContext, &Value) + 'static,
    ) {
        self.registry.register(name, action);
    }

    /// Submit an action: host peers apply it to canonical state
    /// immediately; all peers transmit it (with its seed) so the host can
    /// replay client submissions deterministically.
    ///
    /// # Errors
    ///
    /// In strict mode, an empty registry or unknown name. Transport
    /// failures always propagate.
    pub fn submit_action(
        &mut self,
        name: &str,
        input: Value,
        target: Option<PlayerId>,
    ) -> Result<(), RuntimeError> {
        if self.destroyed {
            warn!(action = name, "submit_action on a destroyed runtime");
            return Ok(());
        }

        match self.registry.lookup(name) {
            ActionLookup::Empty => return self.soften(RuntimeError::NoActionsRegistered),
            ActionLookup::NotFound { suggestion } => {
                if let Some(candidate) = &suggestion {
                    warn!(action = name, candidate = %candidate, "unknown action; did you mean the candidate?");
                }
                return self.soften(RuntimeError::UnknownAction {
                    name: name.to_string(),
                    suggestion,
                });
            }
            ActionLookup::Found => {}
        }

        let seed = next_action_seed();
        let context = ActionContextWire {
            caller: self.local_id.clone(),
            target: target.unwrap_or_else(|| self.local_id.clone()),
            is_host: self.config.is_host,
        };

        // The host's own state reflects its action before the wire message
        // leaves; clients only see the effect via a later state_sync.
        if self.config.is_host {
            self.apply_action(name, &context, seed, &input);
            self.notify_state_changed();
        }

        let envelope = ActionEnvelope {
            action_name: name.to_string(),
            input,
            context,
            action_seed: seed,
        };
        self.transport.send(&WireMessage::Action(envelope), None)?;
        Ok(())
    }

    /// Broadcast a fire-and-forget event to all other peers. No delivery
    /// or ordering guarantee beyond the transport's, and no retry.
    ///
    /// # Errors
    ///
    /// Transport failures propagate.
    pub fn broadcast_event(
        &mut self,
        name: impl Into<String>,
        payload: Value,
    ) -> Result<(), RuntimeError> {
        if self.destroyed {
            warn!("broadcast_event on a destroyed runtime");
            return Ok(());
        }
        let envelope = EventEnvelope {
            event_name: name.into(),
            payload,
        };
        self.transport.send(&WireMessage::Event(envelope), None)?;
        Ok(())
    }

    /// Listen for a named event from other peers. The callback receives
    /// `(sender, payload)`.
    pub fn on_event(
        &mut self,
        name: impl Into<String>,
        callback: impl FnMut(&PlayerId, &Value) + 'static,
    ) -> Subscription {
        self.event_listeners
            .entry(name.into())
            .or_insert_with(Callbacks::new)
            .add(Box::new(callback))
    }

    /// Subscribe to state changes. Fires after any local apply (host
    /// action, escape hatch, lifecycle hook) or inbound state sync.
    pub fn on_state_change(&mut self, callback: impl FnMut(&Value) + 'static) -> Subscription {
        self.state_subscribers.add(Box::new(callback))
    }

    /// The current state tree (canonical on the host, mirror on a client).
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Whether this peer holds host authority.
    pub fn is_host(&self) -> bool {
        self.config.is_host
    }

    /// This peer's id.
    pub fn local_id(&self) -> &PlayerId {
        &self.local_id
    }

    /// Privileged direct-state-mutation escape hatch, reserved for
    /// adapter-internal bookkeeping. Host-only: on a client this is a
    /// warning no-op (strict mode: an error).
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotHost`] in strict mode on a client.
    pub fn mutate_state(&mut self, mutate: impl FnOnce(&mut Value)) -> Result<(), RuntimeError> {
        if !self.config.is_host {
            return self.soften(RuntimeError::NotHost(self.local_id.clone()));
        }
        mutate(&mut self.state);
        self.notify_state_changed();
        Ok(())
    }

    /// Advance the runtime: drain transport events, then (on the host)
    /// feed the sync schedule and broadcast a diff if one is due and
    /// non-empty. A destroyed runtime ignores ticks.
    pub fn tick(&mut self, elapsed_ms: u64) {
        if self.destroyed {
            return;
        }
        for event in self.transport.poll() {
            if self.destroyed {
                return;
            }
            match event {
                TransportEvent::Message(delivery) => {
                    self.handle_message(delivery.sender, delivery.message);
                }
                TransportEvent::PeerJoined(player_id) => self.handle_peer_joined(player_id),
                TransportEvent::PeerLeft(player_id) => self.handle_peer_left(player_id),
            }
        }
        if self.config.is_host && self.schedule.accumulate(elapsed_ms) > 0 {
            self.broadcast_state();
        }
    }

    /// Tear down: stop broadcasting and drop all subscribers. Idempotent
    /// and safe to call multiple times; subsequent API calls are no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.state_subscribers.clear();
        for callbacks in self.event_listeners.values_mut() {
            callbacks.clear();
        }
        self.event_listeners.clear();
    }

    /// Whether [`Runtime::destroy`] has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // -----------------------------------------------------------------
    // Inbound handling
    // -----------------------------------------------------------------

    fn handle_message(&mut self, sender: PlayerId, message: WireMessage) {
        match message {
            WireMessage::Action(envelope) => self.handle_action(sender, envelope),
            WireMessage::StateSync(sync) => self.handle_state_sync(sync),
            WireMessage::Event(envelope) => self.handle_event(&sender, &envelope),
            WireMessage::PlayerJoin { player_id } => self.handle_peer_joined(player_id),
            WireMessage::PlayerLeave { player_id } => self.handle_peer_left(player_id),
            WireMessage::Heartbeat { timestamp_ms } => {
                trace!(sender = %sender, timestamp_ms, "heartbeat");
            }
            WireMessage::HostElectionRequest { candidate } => {
                trace!(candidate = %candidate, "host election is a transport concern; ignoring");
            }
            WireMessage::HostElectionResponse { host } => {
                trace!(host = %host, "host election is a transport concern; ignoring");
            }
        }
    }

    /// Re-apply a client's action against canonical state using the
    /// transmitted seed and context, so random draws match the submitter's
    /// expectations exactly. Clients lack authority and ignore these.
    fn handle_action(&mut self, sender: PlayerId, envelope: ActionEnvelope) {
        if !self.config.is_host {
            trace!(action = %envelope.action_name, "client ignores inbound action");
            return;
        }
        if sender == self.local_id {
            return;
        }
        if self.apply_action(
            &envelope.action_name,
            &envelope.context,
            envelope.action_seed,
            &envelope.input,
        ) {
            self.notify_state_changed();
        } else {
            warn!(
                sender = %sender,
                action = %envelope.action_name,
                "inbound action is not registered here; skipping"
            );
        }
    }

    fn handle_state_sync(&mut self, sync: StateSync) {
        if self.config.is_host {
            debug!("host ignores inbound state_sync");
            return;
        }
        match sync {
            StateSync::Full { state } => {
                self.state = state;
            }
            StateSync::Patches { patches } => {
                if let Err(error) = apply_patch(&mut self.state, &patches) {
                    // Divergence can only come from a reordered or lost
                    // sync stream; flag it and await the next full snapshot.
                    warn!(error = %error, "state patch did not apply cleanly");
                    return;
                }
            }
        }
        self.notify_state_changed();
    }

    fn handle_event(&mut self, sender: &PlayerId, envelope: &EventEnvelope) {
        match self.event_listeners.get_mut(&envelope.event_name) {
            Some(callbacks) => callbacks.notify(|cb| cb(sender, &envelope.payload)),
            None => trace!(event = %envelope.event_name, "no listeners"),
        }
    }

    /// Both roles run the join hook against their local state; only the
    /// host's effect propagates (a client's local mutation is overwritten
    /// by the next sync). The host additionally sends the joiner a full
    /// snapshot, since it has no prior state to patch against.
    fn handle_peer_joined(&mut self, player_id: PlayerId) {
        debug!(player = %player_id, "peer joined");
        let mut hook_ran = false;
        {
            let Self { hooks, state, .. } = self;
            if let Some(hook) = hooks.on_player_join.as_mut() {
                hook(state, &player_id);
                hook_ran = true;
            }
        }
        if hook_ran {
            self.notify_state_changed();
        }
        if self.config.is_host {
            let snapshot = WireMessage::StateSync(StateSync::Full {
                state: self.state.clone(),
            });
            if let Err(error) = self.transport.send(&snapshot, Some(&player_id)) {
                warn!(player = %player_id, error = %error, "full snapshot to joiner failed");
            }
        }
    }

    fn handle_peer_left(&mut self, player_id: PlayerId) {
        debug!(player = %player_id, "peer left");
        let mut hook_ran = false;
        {
            let Self { hooks, state, .. } = self;
            if let Some(hook) = hooks.on_player_leave.as_mut() {
                hook(state, &player_id);
                hook_ran = true;
            }
        }
        if hook_ran {
            self.notify_state_changed();
        }
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Run the named mutator with a context rebuilt from the wire form.
    /// Returns `false` when the action is not registered locally.
    fn apply_action(
        &mut self,
        name: &str,
        context: &ActionContextWire,
        seed: u64,
        input: &Value,
    ) -> bool {
        let Self { registry, state, .. } = self;
        let Some(action) = registry.get_mut(name) else {
            return false;
        };
        let mut ctx = ActionContext {
            caller: context.caller.clone(),
            target: context.target.clone(),
            is_host: context.is_host,
            random: GameRng::new(seed as i64),
        };
        action(state, &mut ctx, input);
        true
    }

    /// Diff canonical state against the last broadcast and ship the patch,
    /// if any. The baseline snapshot advances whether or not the send
    /// succeeded; there is no retransmission at this layer.
    fn broadcast_state(&mut self) {
        let patches = diff(&self.last_broadcast, &self.state);
        if patches.is_empty() {
            return;
        }
        let message = WireMessage::StateSync(StateSync::Patches { patches });
        if let Err(error) = self.transport.send(&message, None) {
            warn!(error = %error, "sync broadcast failed; peers will diverge until the next change");
        }
        self.last_broadcast = self.state.clone();
    }

    fn notify_state_changed(&mut self) {
        let Self {
            state,
            state_subscribers,
            ..
        } = self;
        state_subscribers.notify(|cb| cb(state));
    }

    /// Apply the recoverable-error policy: strict mode propagates,
    /// non-strict logs and skips.
    fn soften(&self, error: RuntimeError) -> Result<(), RuntimeError> {
        if self.config.strict {
            Err(error)
        } else {
            warn!(error = %error, "skipping operation");
            Ok(())
        }
    }
}

/// Check that `setup` produced a record for every declared player under
/// the configured registry key.
fn validate_player_records(state: &Value, config: &RuntimeConfig) -> Result<(), RuntimeError> {
    let registry = state.get(&config.players_key);
    for player in &config.player_ids {
        if registry.and_then(|r| r.get(player.as_str())).is_some() {
            continue;
        }
        let error = RuntimeError::MissingPlayerRecord {
            players_key: config.players_key.clone(),
            player: player.clone(),
        };
        if config.strict_player_init {
            return Err(error);
        }
        warn!(error = %error, "setup contract violation");
    }
    Ok(())
}
