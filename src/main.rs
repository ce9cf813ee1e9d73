use clap::Parser;
use confscan::{
    all_rules, reporter, Cli, Orchestrator, ScanOptions, EXIT_FATAL,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.list_rules {
        list_rules();
        return ExitCode::SUCCESS;
    }

    let options = ScanOptions {
        min_severity: cli.min_severity,
        ignore_file: cli.ignore_file.clone(),
        max_file_size: cli.max_file_size,
    };

    let orchestrator = match Orchestrator::new(options) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let report = orchestrator.scan(&cli.paths);
    print!("{}", reporter::render(&report, cli.format));

    ExitCode::from(report.exit_code())
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn list_rules() {
    for rule in all_rules() {
        println!(
            "{}  {:10} {:10} {}",
            rule.id,
            rule.dialect.as_str(),
            rule.severity.as_str(),
            rule.name
        );
    }
}
