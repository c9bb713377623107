//! Handles all user-facing output for the CLI.
//!
//! Parse results, round-trip verdicts, token dumps and diagnostics are all
//! printed from here so every command reports the same way.

use std::fmt::Debug;
use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::lexer::Token;

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Prints the reconstructed text of a parse result followed by its tree.
pub fn print_parse<N: Debug>(text: &str, node: &N) {
    println!("{}", text);
    println!("{:#?}", node);
}

/// Prints `OK` when `reconstructed` matches `original`, or a line diff and
/// `FAIL` otherwise. Trailing whitespace is ignored.
pub fn print_round_trip(original: &str, reconstructed: &str) -> bool {
    let original = original.trim_end();
    let reconstructed = reconstructed.trim_end();
    if original == reconstructed {
        println!("OK");
        return true;
    }
    let changeset = Changeset::new(original, reconstructed, "\n");
    let mut stdout = StandardStream::stdout(color_choice());
    print_diff(&mut stdout, &changeset.diffs);
    println!("FAIL");
    false
}

/// Prints tokens as a pretty JSON array.
pub fn print_tokens(tokens: &[Token]) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(tokens)?);
    Ok(())
}

/// Renders any diagnostic through miette to stderr.
pub fn print_error<E>(error: E)
where
    E: miette::Diagnostic + Send + Sync + 'static,
{
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn color_choice() -> ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn print_diff<W: WriteColor>(stdout: &mut W, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                let _ = stdout.reset();
                print_lines(stdout, ' ', x);
            }
            Difference::Add(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                print_lines(stdout, '+', x);
            }
            Difference::Rem(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                print_lines(stdout, '-', x);
            }
        }
    }
    let _ = stdout.reset();
}

fn print_lines<W: Write>(stdout: &mut W, marker: char, text: &str) {
    for line in text.lines() {
        let _ = writeln!(stdout, "{}{}", marker, line);
    }
}
