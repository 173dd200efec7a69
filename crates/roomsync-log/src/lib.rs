//! Structured logging for RoomSync peers.
//!
//! Console output via the `tracing` ecosystem with timestamps, module
//! paths, and severity levels. Filtering respects `RUST_LOG` when set and
//! falls back to the caller's default directive otherwise.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `default_directive` is used when `RUST_LOG` is unset, e.g. `"info"` or
/// `"info,roomsync_runtime=debug"`. Call once at process start; a second
/// call panics because the global subscriber is already set.
pub fn init_logging(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

/// The default filter: `info` everywhere.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_enables_info() {
        let filter = default_env_filter();
        assert!(format!("{}", filter).contains("info"));
    }

    #[test]
    fn per_crate_directives_parse() {
        let valid_filters = [
            "info",
            "debug,roomsync_runtime=trace",
            "warn,roomsync_transport=debug",
            "error",
        ];
        for filter_str in &valid_filters {
            assert!(
                EnvFilter::try_from(*filter_str).is_ok(),
                "failed to parse filter: {}",
                filter_str
            );
        }
    }
}
