mod args;
mod logging;
mod output;

use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use anyhow::{Context, Result};
use greycheck::{
    BatchReport, BatchRetryController, ResultSink, TracingObserver, Verifier, VerifyAddress,
    read_addresses,
};

use crate::args::Cli;

// exit codes: 0 all verified, 2 at least one address failed, 1 fatal
fn main() -> ExitCode {
    match run() {
        Ok(report) if report.all_verified() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<BatchReport> {
    let cli = Cli::parse();

    if !cli.has_input() {
        eprintln!("No email address or file provided");
        eprintln!("{}", Cli::clap_command().render_help());
        std::process::exit(1);
    }

    logging::init(cli.verbose, cli.smtp_verbose);

    let verifier = Verifier::from_system(cli.verifier_config())
        .context("initialise DNS resolver")?
        .with_observer(TracingObserver);
    let mut sink = output::sink_for(cli.format)?;

    if let Some(email) = cli.email.as_deref() {
        return Ok(verify_single(&verifier, email, sink.as_mut()));
    }

    let addresses = if let Some(path) = &cli.file {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        read_addresses(BufReader::new(file))
            .with_context(|| format!("read {}", path.display()))?
    } else {
        read_addresses(io::stdin().lock()).context("read stdin")?
    };

    let controller = BatchRetryController::new(&verifier, cli.retry_settings())
        .with_observer(TracingObserver);
    Ok(controller.run(addresses, sink.as_mut()))
}

fn verify_single(
    verifier: &impl VerifyAddress,
    email: &str,
    sink: &mut dyn ResultSink,
) -> BatchReport {
    let mut report = BatchReport {
        rounds: 1,
        ..BatchReport::default()
    };
    match verifier.verify(email) {
        Ok(verification) => {
            report.verified += 1;
            sink.verified(&verification);
        }
        Err(err) => {
            report.failed += 1;
            sink.failed(email, &err);
        }
    }
    report
}
