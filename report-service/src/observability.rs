use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "warn,report_service=info";

/// `RUST_LOG` when set and valid, otherwise [`DEFAULT_DIRECTIVES`].
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Log to stderr so `--json` output on stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
