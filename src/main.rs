//! patient-gateway entry point
//!
//! Delegates to the CLI module. Any startup error is printed to stderr and
//! the process exits non-zero without serving traffic.

use patient_gateway::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("[{}] {}", e.code(), e);
        std::process::exit(1);
    }
}
