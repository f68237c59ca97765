use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber. Debug logging raises only this
/// crate's level; eframe and its graphics stack stay at `info` because they
/// are far too chatty at `debug`. `RUST_LOG` can refine the filter, but only
/// when debug logging is on so a stray environment variable never floods a
/// normal run.
pub fn init(debug: bool) {
    let directives = if debug {
        "info,scan_annotator=debug"
    } else {
        "info"
    };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
    } else {
        EnvFilter::new(directives)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
