mod cli;
mod commands;
mod logger;
mod settings;

use clap::Parser;
use tracing::error;

use crate::cli::Cli;

fn main() {
    logger::init_logger();
    let cli = Cli::parse();
    if let Err(err) = commands::execute(cli) {
        error!("{err}");
        std::process::exit(1);
    }
}
