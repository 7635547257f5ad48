//! SPL command-line front end.
//!
//! ```text
//! source ──► spl_lexer::tokenize ──► spl_parse::parse_tokens ──► Interpreter::run
//! ```
//!
//! The `spl` binary dispatches to [`commands`]; the library half exists so
//! the end-to-end tests can drive the same code paths.

use std::sync::Once;

pub mod commands;

pub use commands::{exit_code, run_source, RunOptions};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber.
///
/// Nothing is installed unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=spl_eval=debug`. With `SPL_LOG_TREE` also set, spans render as
/// an indented tree instead of flat lines. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var_os("SPL_LOG_TREE").is_some() {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            // Program output owns stdout.
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
