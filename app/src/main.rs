mod cli;
mod input;
mod report;

use clap::Parser;
use env_logger::Env;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
    cli::run(cli)
}
