use tracing_subscriber::EnvFilter;

pub fn init_logger() {
    // a host may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("next_static_context=info")),
        )
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
