//! One-time `tracing` subscriber setup, adapted from the next-closest pack
//! repo's `logger.rs` (the teacher itself has no logging crate, only
//! `println!`). Unlike that source, level is controlled only by the `-v`
//! CLI flag — never by `RUST_LOG` or any other environment variable, per
//! this binary's "no environment variables affect behavior" invocation
//! contract.

use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::fmt;

static INIT: OnceLock<()> = OnceLock::new();

/// Initialize the global subscriber once per process. `verbosity` follows
/// the common `-v`/`-vv` convention: 0 = warnings and errors only, 1 =
/// info, 2+ = debug.
pub fn init(verbosity: u8) {
    INIT.get_or_init(|| {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        };

        let subscriber = fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
