use clap::Parser;
use tradezilla::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
