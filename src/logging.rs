use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: OnceCell<()> = OnceCell::new();

/// Install the global subscriber, filtered by `RUST_LOG` (default `info`)
///
/// Safe to call more than once, only the first call does anything.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = fmt().with_env_filter(filter).finish();

        // forward `log` records from dependencies
        if let Err(error) = tracing_log::LogTracer::init() {
            eprintln!("unable to forward log records: {error}");
        }

        if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("unable to set global tracing subscriber: {error}");
        }
    });
}
