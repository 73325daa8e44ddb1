use std::process;
use clap::Parser;
use tracing::debug;

use bejw::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.run() {
        debug!(code = e.error_code(), "Command failed");
        if e.is_user_error() {
            println!("{}", e);
        } else {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}
