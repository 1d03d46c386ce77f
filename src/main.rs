//! Shelf - Personal library catalog

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = shelf_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
