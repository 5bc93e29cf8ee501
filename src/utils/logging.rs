use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "FENCEBOX_LOG";

/// Pick the filter directive: `--verbose` beats the environment, which beats
/// the configured default.
pub fn resolve_filter(verbose: bool, env_value: Option<&str>, configured: &str) -> String {
    if verbose {
        return "debug".to_string();
    }
    match env_value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => configured.to_string(),
    }
}

/// Install the stderr subscriber. Safe to call more than once; later calls
/// leave the first subscriber in place.
pub fn init_logging(verbose: bool, configured: &str) {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let directive = resolve_filter(verbose, env_value.as_deref(), configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
