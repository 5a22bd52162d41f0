//! Tracing subscriber setup for host apps embedding the session core.

/// Install a fmt subscriber filtered by `filter` (an `EnvFilter` directive
/// such as `outfit_auth=debug`). `RUST_LOG`, when set, wins.
///
/// Returns `false` when a global subscriber is already installed, so calling
/// this from several entry points is harmless.
pub fn init(filter: &str) -> bool {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
