//! Logging setup for the kiosk binary.
//!
//! The kiosk's terminal is its user interface: menus, prompts and admin
//! reports are written to stdout and answered on the same stdin stream the
//! scanner types into. Diagnostics therefore always go to stderr, where an
//! operator can redirect them to a file or journald without the person at
//! the desk ever seeing a log line between two prompts.

use std::io;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or unparsable.
fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install the global subscriber.
///
/// `default_filter` applies when `RUST_LOG` is not set (the binary passes
/// `"shelfscan=info"`). `log_json` switches stderr output to one JSON object
/// per line for log shippers.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let json = log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
    });
    let text = (!log_json).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(json)
        .with(text)
        .init();
}
