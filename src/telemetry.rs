// Diagnostics for the expense programs. Events go to stderr so stdout holds
// nothing but the program's result.
//
// What gets logged:
// - `debug`: method and URL of the outgoing request, and whether a `.env`
//   file was loaded. Headers are never logged, so the CSRF token and session
//   cookies stay out of the output.
// - `info`: one event per finished call, with the program name and whether
//   the API reported a failure (or the error that stopped the call).
// - `warn`: a non-success HTTP status.
// reqwest and hyper log through the `log` crate and are bridged in here.

use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid: only warnings, so a
/// normal run prints just its outcome.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. `RUST_LOG` overrides the default filter,
/// e.g. `RUST_LOG=expense_cli=debug` to see the request URL.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let _ = LogTracer::init();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}
