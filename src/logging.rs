//! Logging setup for the binary

use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Default filter for a verbosity count: warn, `-v` debug, `-vv` trace
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "exam_results=debug,info",
        _ => "exam_results=trace,debug",
    }
}

/// Install the stderr subscriber. `RUST_LOG`, when set, overrides the
/// verbosity flags.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 2)
        .try_init();

    debug!("exam-results started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(0), "warn");
        assert!(default_filter(1).contains("debug"));
        assert!(default_filter(5).contains("trace"));
    }

    #[test]
    fn test_filters_parse() {
        for verbose in 0..3 {
            assert!(EnvFilter::try_new(default_filter(verbose)).is_ok());
        }
    }
}
