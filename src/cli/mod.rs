//! The Rewind Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::Parser as _;
use log::{info, LevelFilter};
use miette::Diagnostic;
use simple_logger::SimpleLogger;
use thiserror::Error;

use crate::ast::{Node, Span};
use crate::cli::args::{Command, RewindArgs, Rule};
use crate::config::{SourceConfig, DEFAULT_FILENAME};
use crate::errors::{ConfigError, SyntaxError};
use crate::grammar::Parser;
use crate::lexer;
use crate::source::{Position, Source};

pub mod args;
pub mod output;

/// Anything that stops a command before it can report a verdict.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(rewind::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("failed to serialize tokens")]
    #[diagnostic(code(rewind::json))]
    Json(#[from] serde_json::Error),
}

/// The main entry point for the CLI.
pub fn run() {
    let args = RewindArgs::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Command::Parse {
            file,
            code,
            rule,
            dedent,
            config,
            section,
        } => {
            let request = ParseRequest {
                file,
                code,
                rule,
                dedent,
                config,
                section,
            };
            handle_parse(&request)
        }
        Command::Tokens { file } => handle_tokens(&file).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            output::print_error(e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to initialise logging: {}", e);
    }
}

// ============================================================================
// PARSE
// ============================================================================

/// Everything the `parse` subcommand needs.
#[derive(Debug, Clone)]
pub struct ParseRequest {
    pub file: Option<PathBuf>,
    pub code: Option<String>,
    pub rule: Rule,
    pub dedent: isize,
    pub config: Option<PathBuf>,
    pub section: bool,
}

/// Parse the requested input, print the result and report whether the
/// consumed tokens reproduce the input text.
pub fn handle_parse(request: &ParseRequest) -> Result<bool, CliError> {
    let mut config = match &request.config {
        Some(path) => SourceConfig::from_json_file(path)?,
        None => SourceConfig::default(),
    };
    let text = match (&request.code, &request.file) {
        (Some(code), _) => code.clone(),
        (None, Some(path)) => {
            if config.filename == DEFAULT_FILENAME {
                config.filename = path.display().to_string();
            }
            read_file(path)?
        }
        (None, None) => String::new(),
    };
    info!("parsing {} as {:?}", config.filename, request.rule);

    let source = if request.section {
        let section = config.select(&text)?;
        Source::from_section(&text, section)?
    } else {
        Source::with_config(text, &config)?
    };
    let mut parser = Parser::new(&source);
    match request.rule {
        Rule::Expr => {
            let expr = required(&mut parser, Parser::expr, "Expected expression")?;
            output::print_parse(&expr.to_text(request.dedent), &expr);
        }
        Rule::Stmt => {
            let stmt = required(&mut parser, Parser::stmt, "Expected statement")?;
            output::print_parse(&stmt.to_text(request.dedent), &stmt);
        }
        Rule::Defs => {
            let defs = parser.definitions()?;
            let texts: Vec<String> = defs.iter().map(|def| def.to_text(request.dedent)).collect();
            output::print_parse(&texts.join("\n\n"), &defs);
        }
    }

    let consumed = Span::new(Position::START, parser.cursor().position(), &source);
    Ok(output::print_round_trip(source.text(), &consumed.text(0)))
}

fn required<'src, N>(
    parser: &mut Parser<'src>,
    rule: fn(&mut Parser<'src>) -> Result<Option<N>, SyntaxError>,
    message: &str,
) -> Result<N, SyntaxError> {
    match rule(parser)? {
        Some(node) => Ok(node),
        None => Err(parser.cursor_mut().syntax_error(message)),
    }
}

// ============================================================================
// TOKENS
// ============================================================================

/// Print the tokens of `path` as JSON.
pub fn handle_tokens(path: &Path) -> Result<(), CliError> {
    let text = read_file(path)?;
    let config = SourceConfig::named(path.display().to_string());
    let tokens = lexer::tokenize(&text, &config)?;
    output::print_tokens(&tokens)?;
    Ok(())
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
