//! Defines the command-line arguments and subcommands for the Rewind CLI.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "rewind",
    version,
    about = "Parse C-like source with a backtracking token parser and check that spans reproduce the text."
)]
pub struct RewindArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse input with one grammar rule and verify the round trip.
    Parse {
        /// The path to the file to parse.
        #[arg(required_unless_present = "code", conflicts_with = "code")]
        file: Option<PathBuf>,
        /// Parse this text instead of a file.
        #[arg(short = 'c', long = "code")]
        code: Option<String>,
        /// The grammar rule to start from.
        #[arg(long, value_enum, default_value_t = Rule::Expr)]
        rule: Rule,
        /// Columns to remove (or add, if negative) when printing the parsed text.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        dedent: isize,
        /// JSON file with source settings.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Only parse the lines between the configured section markers.
        #[arg(long)]
        section: bool,
    },
    /// Print the tokens of a file as JSON.
    Tokens {
        /// The path to the file to tokenize.
        #[arg(required = true)]
        file: PathBuf,
    },
}

/// Grammar entry points reachable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Rule {
    /// A single expression.
    Expr,
    /// A single statement.
    Stmt,
    /// A sequence of `inst` and `family` definitions.
    Defs,
}
