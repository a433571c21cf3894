#![allow(clippy::print_stderr, clippy::print_stdout)]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use widl_cli::args::{CliArgs, Command};
use widl_cli::driver;

/// Builds an `EnvFilter` from `WIDL_LOG`, falling back to `RUST_LOG`.
fn init_tracing() {
    let filter = match std::env::var("WIDL_LOG") {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    match args.command {
        Command::Compile { output, groups } => {
            let diagnostics = driver::compile(&groups, &output)?;
            for diagnostic in &diagnostics {
                eprintln!("warning: {diagnostic}");
            }
        }
        Command::Query {
            database,
            identifier,
        } => {
            println!("{}", driver::query(&database, &identifier)?);
        }
        Command::Stats { database } => {
            print!("{}", driver::stats(&database)?);
        }
    }
    Ok(())
}
