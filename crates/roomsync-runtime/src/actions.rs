//! Action registry and per-invocation context.
//!
//! Actions are the only sanctioned way for game logic to mutate state.
//! Each is registered under a unique name with a mutator
//! `(state, context, input)`; dispatch validates the name against the
//! registry and reports a closed lookup result rather than throwing, with
//! strict/non-strict policy applied at the call site.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use roomsync_rng::GameRng;
use roomsync_wire::PlayerId;
use serde_json::Value;

/// Maximum edit distance for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: usize = 3;

/// First action seed handed out. Starts above a low-collision threshold so
/// action seeds never overlap small hand-picked seeds (like the setup seed
/// namespace) used elsewhere.
const ACTION_SEED_START: u64 = 10_000;

/// Process-wide monotonically increasing action-seed counter. Incremented
/// once per submitted action regardless of host/client role; the drawn seed
/// travels verbatim with the action so every replaying peer reconstructs
/// the identical random sequence.
static NEXT_ACTION_SEED: AtomicU64 = AtomicU64::new(ACTION_SEED_START);

/// Draw the next action seed.
pub(crate) fn next_action_seed() -> u64 {
    NEXT_ACTION_SEED.fetch_add(1, Ordering::Relaxed)
}

/// Per-invocation context handed to an action mutator.
///
/// Created fresh for each invocation and discarded afterwards. `target`
/// defaults to `caller` when the submitter named no target; the distinction
/// lets one participant's input affect another participant's data.
pub struct ActionContext {
    /// Peer that submitted the action.
    pub caller: PlayerId,
    /// Peer whose data the action targets.
    pub target: PlayerId,
    /// Whether the *submitting* peer held host authority. Replays observe
    /// the submitter's value, not the replayer's.
    pub is_host: bool,
    /// Random source seeded from the action seed. Identical on every peer
    /// that applies this invocation.
    pub random: GameRng,
}

/// A registered state mutator.
pub type ActionFn = Box<dyn FnMut(&mut Value, &mut ActionContext, &Value)>;

/// Result of validating an action name against the registry.
#[derive(Debug, PartialEq, Eq)]
pub enum ActionLookup {
    /// The name is registered.
    Found,
    /// The name is unknown; `suggestion` holds the closest registered name
    /// within edit distance [`SUGGESTION_THRESHOLD`], if any.
    NotFound {
        /// Best-effort "did you mean" candidate.
        suggestion: Option<String>,
    },
    /// Nothing is registered at all.
    Empty,
}

/// Map from action name to mutator.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionFn>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `name`, replacing any previous registration.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        action: impl FnMut(&mut Value, &mut ActionContext, &Value) + 'static,
    ) {
        self.actions.insert(name.into(), Box::new(action));
    }

    /// Validate `name` without invoking anything.
    pub fn lookup(&self, name: &str) -> ActionLookup {
        if self.actions.is_empty() {
            return ActionLookup::Empty;
        }
        if self.actions.contains_key(name) {
            return ActionLookup::Found;
        }
        ActionLookup::NotFound {
            suggestion: suggest(name, self.actions.keys()),
        }
    }

    /// Fetch the mutator registered under `name`.
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ActionFn> {
        self.actions.get_mut(name)
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Pick the registered name closest to `name` within the suggestion
/// threshold. Ties resolve lexicographically so diagnostics are stable.
fn suggest<'a>(name: &str, registered: impl Iterator<Item = &'a String>) -> Option<String> {
    registered
        .map(|candidate| (levenshtein(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= SUGGESTION_THRESHOLD)
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
        .map(|(_, candidate)| candidate.clone())
}

/// Classic two-row Levenshtein edit distance.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
