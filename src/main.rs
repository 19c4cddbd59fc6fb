#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # didact
//!
//! An interactive recursion tutor. `didact grade` checks a factorial
//! submission against the fixed test cases, `didact serve` runs the tutoring
//! page with grading and hint endpoints, and `didact snippet` prints the
//! built-in hint snippets.

use std::io::Read;

use anyhow::{Context, Result, bail};
use bpaf::*;
use colored::Colorize;
use didact::{grade, server, snippets, tutor::Tutor};
use dotenvy::dotenv;
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a submission file, optionally emitting JSON
    Grade(bool, String),
    /// Serve the tutoring page and API
    Serve(u16),
    /// Show built-in hint snippets
    Snippet(Option<String>),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the submission file path
    fn f() -> impl Parser<String> {
        positional("FILE").help("Path to a factorial submission, or - for stdin")
    }

    /// parses the JSON output switch
    fn j() -> impl Parser<bool> {
        long("json").help("Print the report as JSON").switch()
    }

    /// parses the port to listen on
    fn p() -> impl Parser<u16> {
        short('p')
            .long("port")
            .help("Port to listen on")
            .argument::<u16>("PORT")
            .fallback(8080)
    }

    /// parses an optional snippet name
    fn s() -> impl Parser<Option<String>> {
        positional("NAME").help("Name of the snippet to print").optional()
    }

    let grade = construct!(Cmd::Grade(j(), f()))
        .to_options()
        .command("grade")
        .help("Grade a factorial submission against the fixed test cases");

    let serve = construct!(Cmd::Serve(p()))
        .to_options()
        .command("serve")
        .help("Serve the tutoring page and API");

    let snippet = construct!(Cmd::Snippet(s()))
        .to_options()
        .command("snippet")
        .help("List or print built-in hint snippets");

    let cmd = construct!([grade, serve, snippet]);

    cmd.to_options().descr("An interactive recursion tutor").run()
}

/// Reads the submission source from a file, or stdin when the path is `-`.
fn read_submission(path: &str) -> Result<String> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Could not read submission from stdin")?;
        Ok(source)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Could not read {path}"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let cmd = options();

    match cmd {
        Cmd::Grade(json, path) => {
            let source = read_submission(&path)?;
            match grade(&source) {
                Ok(report) if json => {
                    println!("{}", report.to_json().context("Could not serialize report")?);
                }
                Ok(report) => {
                    eprintln!("{}", report.table());
                    for line in report.lines() {
                        println!("{line}");
                    }
                    if report.all_passed() {
                        println!("\n{}", "All tests passed!".green().bold());
                    }
                }
                Err(e) if json => {
                    println!("{}", serde_json::json!({ "error": e.to_string() }));
                }
                Err(e) => println!("{e}"),
            }
        }
        Cmd::Serve(port) => {
            server::serve(Tutor::from_env(), port).await?;
        }
        Cmd::Snippet(None) => {
            for name in snippets::SNIPPET_NAMES {
                println!("{name}");
            }
        }
        Cmd::Snippet(Some(name)) => match snippets::snippet(&name) {
            Some(text) => println!("{text}"),
            None => bail!(
                "No snippet named `{name}`; available: {}",
                snippets::SNIPPET_NAMES.join(", ")
            ),
        },
    };

    Ok(())
}
