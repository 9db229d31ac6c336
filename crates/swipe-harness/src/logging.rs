use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter for a given `-v` count. `RUST_LOG` takes precedence.
#[must_use]
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,swipe_core=debug,swipe_harness=debug",
        _ => "warn,swipe_core=trace,swipe_harness=trace",
    }
}

/// Install the stderr subscriber. Later calls are no-ops.
pub fn init(verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::default_filter;

    #[test]
    fn verbosity_raises_engine_level() {
        assert_eq!(default_filter(0), "warn");
        assert!(default_filter(1).contains("swipe_core=debug"));
        assert!(default_filter(2).contains("swipe_core=trace"));
        assert_eq!(default_filter(9), default_filter(2));
    }
}
