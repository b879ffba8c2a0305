//! Storefront command-line entry point

use std::io;

use clap::Parser;
use storefront::{cli::Cli, logging};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.logging)?;

    cli.run(io::stdout().lock())
}
