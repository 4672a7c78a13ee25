use std::sync::Once;

static INIT: Once = Once::new();

/// Install the global logger once. `RUST_LOG` wins over the default level;
/// `verbose` forces debug output.
///
/// Engine `tracing` events reach this logger through the `log` feature.
pub fn init_logging(verbose: bool) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match std::env::var("RUST_LOG") {
            _ if verbose => builder.filter_level(log::LevelFilter::Debug),
            Ok(filter) => builder.parse_filters(&filter),
            Err(_) => builder.filter_level(log::LevelFilter::Info),
        };
        builder.init();
    });
}
