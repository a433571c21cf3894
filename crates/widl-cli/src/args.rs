use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the widlc binary.
#[derive(Parser, Debug)]
#[command(name = "widlc", version, about = "Web IDL database compiler")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile AST group files into a database artifact.
    Compile {
        /// Where to write the compiled database.
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// AST group files, one JSON document per component.
        #[arg(required = true)]
        groups: Vec<PathBuf>,
    },

    /// Look up a definition in a compiled database.
    Query {
        /// Path to a compiled database.
        #[arg(short = 'd', long)]
        database: PathBuf,

        /// Identifier of the definition to look up.
        identifier: String,
    },

    /// Print per-kind definition counts of a compiled database.
    Stats {
        /// Path to a compiled database.
        #[arg(short = 'd', long)]
        database: PathBuf,
    },
}
