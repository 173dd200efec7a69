//! Runtime configuration consumed at construction.

use roomsync_wire::PlayerId;

/// Default sync-broadcast interval: 50 ms (20 Hz).
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 50;

/// Default key under which the player registry lives in the state tree.
pub const DEFAULT_PLAYERS_KEY: &str = "players";

/// Configuration surface for a [`crate::Runtime`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Whether this peer runs the authoritative simulation.
    pub is_host: bool,
    /// Declared participants, handed to the `setup` hook.
    pub player_ids: Vec<PlayerId>,
    /// Milliseconds between host sync broadcasts.
    pub sync_interval_ms: u64,
    /// When `true`, conditions that would otherwise be logged warnings
    /// (unknown action, client escape-hatch use, …) become errors.
    pub strict: bool,
    /// When `true`, a `setup` result missing a record for a declared player
    /// is a construction error instead of a warning.
    pub strict_player_init: bool,
    /// Key of the player registry inside the state tree.
    pub players_key: String,
}

impl RuntimeConfig {
    /// Host-role configuration with defaults.
    pub fn host(player_ids: Vec<PlayerId>) -> Self {
        Self::new(true, player_ids)
    }

    /// Client-role configuration with defaults.
    pub fn client(player_ids: Vec<PlayerId>) -> Self {
        Self::new(false, player_ids)
    }

    fn new(is_host: bool, player_ids: Vec<PlayerId>) -> Self {
        Self {
            is_host,
            player_ids,
            sync_interval_ms: DEFAULT_SYNC_INTERVAL_MS,
            strict: false,
            strict_player_init: false,
            players_key: DEFAULT_PLAYERS_KEY.to_string(),
        }
    }

    /// Override the sync-broadcast interval.
    pub fn with_sync_interval_ms(mut self, interval_ms: u64) -> Self {
        self.sync_interval_ms = interval_ms;
        self
    }

    /// Enable strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable strict player-initialization validation.
    pub fn with_strict_player_init(mut self, strict: bool) -> Self {
        self.strict_player_init = strict;
        self
    }

    /// Use a different player-registry key.
    pub fn with_players_key(mut self, key: impl Into<String>) -> Self {
        self.players_key = key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = RuntimeConfig::host(vec![PlayerId::from("h")]);
        assert!(config.is_host);
        assert_eq!(config.sync_interval_ms, 50);
        assert!(!config.strict);
        assert!(!config.strict_player_init);
        assert_eq!(config.players_key, "players");

        let client = RuntimeConfig::client(vec![]);
        assert!(!client.is_host);
    }

    #[test]
    fn builders_override_defaults() {
        let config = RuntimeConfig::client(vec![])
            .with_sync_interval_ms(100)
            .with_strict(true)
            .with_strict_player_init(true)
            .with_players_key("elves");
        assert_eq!(config.sync_interval_ms, 100);
        assert!(config.strict);
        assert!(config.strict_player_init);
        assert_eq!(config.players_key, "elves");
    }
}
