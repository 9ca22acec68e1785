mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Command};
use libsrcfacts_core::SrcFactsError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run_command(&cli) {
        output::report_error(&cli, &e);
        std::process::exit(e.exit_code());
    }
}

/// Logs go to stderr so stdout stays parseable
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_command(cli: &Cli) -> Result<(), SrcFactsError> {
    match &cli.command {
        Command::Extract {
            db,
            config,
            archive,
            standalone,
            integrated,
            output,
            pattern,
            paths,
        } => commands::extract::run(
            cli,
            commands::extract::ExtractArgs {
                db: db.clone(),
                config: config.clone(),
                archive: archive.clone(),
                standalone: *standalone,
                integrated: *integrated,
                output: output.clone(),
                pattern: pattern.clone(),
                paths: paths.clone(),
            },
        ),
        Command::Dump { db, relation } => commands::dump::run(cli, db, relation.as_deref()),
        Command::Stats { db } => commands::stats::run(cli, db),
    }
}
