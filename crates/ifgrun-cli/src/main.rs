use clap::Parser;
use ifgrun_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Usage errors exit here, before anything touches the filesystem.
    let cli = Cli::parse();

    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = cli.run() {
        eprintln!("ifgrun error: {:#}", err);
        std::process::exit(1);
    }
}
