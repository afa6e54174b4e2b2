use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber for binaries. Honors `RUST_LOG`, defaults to `info`.
/// Calling it twice is harmless: the second install is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
