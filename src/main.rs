//! # Hilite - Multi-Word Highlighter
//!
//! Keeps a list of up to five words and shows where each one occurs in a
//! file, every word in its own color.
//!
//! ## Quick Start
//!
//! ```bash
//! # Highlight "foo" and "bar" in a file (the list is remembered)
//! cargo run -- src/main.rs --word foo --word bar
//!
//! # Toggle the word under character offset 120
//! cargo run -- src/main.rs --caret 120
//!
//! # Forget every word
//! cargo run -- --clear
//! ```

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hilite_core::{Command, CommandOutcome, Config, DocumentId, Editor, MemorySettings};

/// Hilite - highlight several words at once
#[derive(Parser, Debug)]
#[command(name = "hilite")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to highlight
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Toggle a word in the highlight list (repeatable)
    #[arg(short, long, value_name = "WORD")]
    word: Vec<String>,

    /// Toggle the word at this character offset of FILE
    #[arg(long, value_name = "OFFSET", requires = "file")]
    caret: Option<usize>,

    /// Clear the highlight list first
    #[arg(long)]
    clear: bool,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Keep the word list in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Print tags as JSON
    #[arg(long)]
    json: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// One highlighted occurrence, as printed.
#[derive(Debug, Serialize)]
struct TagReport {
    line: usize,
    column: usize,
    start: usize,
    end: usize,
    word: String,
    color: usize,
    marker: String,
    background: String,
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Hilite v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load(),
    };

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let mut editor = if args.ephemeral {
        Editor::with_settings(config, Arc::new(MemorySettings::new()))
    } else {
        Editor::open(config)?
    };

    if args.clear {
        editor.execute(Command::RemoveAllWords)?;
    }

    let document = match &args.file {
        Some(path) => Some(
            editor
                .open_file(path)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => None,
    };

    if let Some(offset) = args.caret {
        editor.move_caret_to(offset)?;
        report(editor.execute(Command::ToggleWord { word: None })?);
    }

    for word in &args.word {
        let command = Command::ToggleWord {
            word: Some(word.clone()),
        };
        if command.explicit_word().is_none() {
            anyhow::bail!("{:?} is not a single word", word);
        }
        report(editor.execute(command)?);
    }

    match document {
        Some(id) => print_tags(&editor, id, args.json)?,
        None => print_words(&editor),
    }

    editor.close()?;
    Ok(())
}

/// Logs what a toggle did.
fn report(outcome: CommandOutcome) {
    match outcome {
        CommandOutcome::Toggled {
            word,
            applied: true,
        } => tracing::info!("Toggled {:?}", word),
        CommandOutcome::Toggled {
            word,
            applied: false,
        } => eprintln!("Highlight list is full, {:?} was not added", word),
        CommandOutcome::NoWord => eprintln!("No word at the caret"),
        CommandOutcome::Cleared => tracing::info!("Cleared highlight list"),
    }
}

fn print_words(editor: &Editor) {
    for (position, word) in editor.words().iter().enumerate() {
        println!("{}  {}", hilite_core::color_index(position).display_name(), word);
    }
}

fn print_tags(editor: &Editor, id: DocumentId, json: bool) -> anyhow::Result<()> {
    let doc = editor.document(id)?;
    let snapshot = doc.snapshot();

    let mut reports = Vec::new();
    for tag in editor.tags(id, snapshot.full_span())? {
        let position = doc.buffer().char_idx_to_position(tag.span.start)?;
        reports.push(TagReport {
            line: position.line + 1,
            column: position.column + 1,
            start: tag.span.start,
            end: tag.span.end,
            word: snapshot.slice(tag.span)?.into_owned(),
            color: tag.color.get(),
            marker: tag.color.marker_name(),
            background: editor.style(&tag).background,
        });
    }
    reports.sort_by_key(|report| report.start);

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!(
                "{}:{}  {:<12} {}",
                report.line, report.column, report.background, report.word
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["hilite"]);
        assert!(args.file.is_none());
        assert!(args.word.is_empty());
        assert!(!args.clear);
    }

    #[test]
    fn test_args_with_file_and_words() {
        let args = Args::parse_from(["hilite", "test.rs", "-w", "foo", "--word", "bar"]);
        assert_eq!(args.file, Some(PathBuf::from("test.rs")));
        assert_eq!(args.word, ["foo", "bar"]);
    }

    #[test]
    fn test_caret_requires_file() {
        assert!(Args::try_parse_from(["hilite", "--caret", "3"]).is_err());
        let args = Args::parse_from(["hilite", "a.txt", "--caret", "3", "-vv"]);
        assert_eq!(args.caret, Some(3));
        assert_eq!(args.verbose, 2);
    }
}
