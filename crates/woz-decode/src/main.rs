//! Entrypoint for the `woz-decode` tool.
//!
//! The binary delegates to [`woz_decode::run`], which loads configuration,
//! installs telemetry, and decodes JSONL envelopes from standard input.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    woz_decode::run(std::env::args_os(), stdin, &mut stdout, &mut stderr)
}
