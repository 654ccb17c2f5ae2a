//! Tracing setup
//!
//! The engine emits `tracing` events (cache misses and flushes at debug/info,
//! overload outcomes at trace). Embedders normally install their own
//! subscriber; [`init_tracing`] is a convenience for binaries and tests.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a formatting subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset or a global subscriber already
/// exists. Safe to call repeatedly.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
