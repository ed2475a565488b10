//! Table-driven UI test runner
//!
//! Thin process glue: argument parsing, dispatch into the library, and
//! exit-code mapping. Verdicts never affect the exit code; only usage
//! errors and runtime faults do.

use clap::error::ErrorKind;
use clap::Parser;
use tabletest::cli;

#[tokio::main]
async fn main() {
    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                std::process::exit(0);
            }
            _ => {
                eprint!("{e}");
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = cli::run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
