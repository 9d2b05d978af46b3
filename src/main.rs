use clap::Parser;
use classifier::cli::{Cli, init_tracing, run_cli};
use classifier::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_cli(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {e}"));
            ExitCode::FAILURE
        }
    }
}
