//! Host-authoritative state-synchronization runtime.
//!
//! One peer (the host) owns the canonical game-state tree; every other peer
//! mirrors it. Game authors express logic as registered state-mutating
//! actions rather than network code: submitting an action routes it through
//! the host, which applies it against canonical state and periodically
//! ships minimal diffs to all mirrors. Deterministic per-action random
//! seeds travel with each submission so a replayed action produces
//! identical results on every peer.

pub mod actions;
pub mod config;
pub mod error;
pub mod hooks;
pub mod runtime;
pub mod schedule;
pub mod subscribers;

pub use actions::{ActionContext, ActionLookup, ActionRegistry};
pub use config::{RuntimeConfig, DEFAULT_PLAYERS_KEY, DEFAULT_SYNC_INTERVAL_MS};
pub use error::RuntimeError;
pub use hooks::{GameHooks, SetupContext, SETUP_SEED};
pub use runtime::Runtime;
pub use schedule::SyncSchedule;
pub use subscribers::Subscription;
