//! superxbr - Command-line tool for Super-xBR 2x image upscaling

use std::process::ExitCode;

use superxbr::cli;

fn main() -> ExitCode {
    cli::run()
}
