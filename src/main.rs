//! # asset-dedup CLI
//!
//! Command-line interface for the duplicate asset finder.
//!
//! ## Usage
//! ```bash
//! asset-dedup scan ~/Photos
//! asset-dedup scan library.json --output json
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
