use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;

/// Progress notices go to stderr at INFO; `verbose` adds the per-record
/// DEBUG output from the parser and the backend client.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let _ = fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
