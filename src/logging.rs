use log::{debug, LevelFilter};

/// Quiet wins over verbose.
pub fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Off
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize the logger. `RUST_LOG` still applies on top of the chosen level.
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = level_for(verbose, quiet);

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .try_init();

    debug!("Logger initialized with level: {level:?}");
}
