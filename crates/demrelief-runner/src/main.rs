use clap::Parser;
use demrelief_runner::{logging, resolve_config, run, Cli};
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init_logging(&config.log);
    debug!(dataset = %config.api.dataset, executable = %config.blender.executable.display(), "configuration resolved");

    let stdout = std::io::stdout();
    match run(&cli.command, &config, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
