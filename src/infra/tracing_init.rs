use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_FILTER: &str = "sbctl=warn";

/// Installs the global subscriber. Logs go to stderr so stdout stays
/// machine-readable for launcher output.
///
/// `RUST_LOG` overrides `default_filter`; `log_json` switches to JSON lines.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // try_init: a second call (tests, embedding) keeps the first subscriber.
    if log_json {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    }
}
