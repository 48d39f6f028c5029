use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Overrides the filter built from `-v` / `-s` with an `EnvFilter` directive
/// string, e.g. `GREYCHECK_LOG=greycheck=trace`.
pub const LOG_ENV: &str = "GREYCHECK_LOG";

pub fn init(verbose: bool, smtp_verbose: bool) {
    let directives = std::env::var(LOG_ENV).unwrap_or_else(|_| directives(verbose, smtp_verbose));
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(ChronoLocal::new("%H:%M:%S".to_string()))
        .with_target(false)
        .compact()
        .init();
}

fn directives(verbose: bool, smtp_verbose: bool) -> String {
    let verifier = if verbose { "debug" } else { "warn" };
    let smtp = if smtp_verbose { "trace" } else { verifier };
    format!("warn,greycheck={verifier},greycheck::smtp={smtp}")
}
