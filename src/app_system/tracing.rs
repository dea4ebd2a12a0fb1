/// Sets up structured logging for the whole system.
///
/// `RUST_LOG` controls verbosity (default `info`), e.g.
/// `RUST_LOG=smart_shelf::feed=debug,info`.
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
