//! Statcard - Command-line tool for rendering statistics cards from snapshot files

use std::process::ExitCode;

use statcard::cli;

fn main() -> ExitCode {
    cli::run()
}
