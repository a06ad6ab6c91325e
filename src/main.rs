use clap::Parser;
use sbt::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
