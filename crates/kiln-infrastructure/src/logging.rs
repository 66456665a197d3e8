//! Structured logging setup, layered over `tracing-subscriber`.

/// Install a global `tracing` subscriber reading its filter from `RUST_LOG`
/// (defaulting to `info` when unset). Call once at process startup; a
/// second call is a no-op logged at `warn`.
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::warn!("global tracing subscriber already installed; ignoring second init() call");
    }
}
