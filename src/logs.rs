use {
    super::*,
    tracing_subscriber::{EnvFilter, fmt},
};

/// Log to stderr so stdout stays machine readable. Filtered by `RUST_LOG`,
/// quiet apart from warnings when it is unset.
pub(crate) fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Err(err) = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("failed to initialize logging: {err}");
    }
}
