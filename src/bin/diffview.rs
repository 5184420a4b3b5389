//! # diffview CLI - Compare two text files
//!
//! A command-line front end for the diffview library.
//!
//! ## Features
//! - Side-by-side or inline terminal output with changed characters highlighted
//! - HTML and JSON output
//! - Raw alignment operations for scripting
//! - Summary statistics
//!
//! ## Usage
//! ```bash
//! # Side-by-side comparison
//! diffview show old.txt new.txt
//!
//! # Inline, keeping three lines of context around changes
//! diffview show old.txt new.txt --inline --context 3
//!
//! # HTML fragment
//! diffview show old.txt new.txt --html > diff.html
//!
//! # Alignment operations as JSON
//! diffview opcodes old.txt new.txt --json
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use diffview::{
    Cell, ContextSize, DiffError, DiffOptions, Differ, DifferBuilder, HtmlRenderer, Layout, LineRow, MarkedLine, OpKind,
    Report, Row,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Widest base column drawn in side-by-side terminal output
const MAX_COLUMN_WIDTH: usize = 80;

/// diffview CLI - line and character level text comparison
#[derive(Parser)]
#[command(name = "diffview")]
#[command(version)]
#[command(about = "Compare two texts line by line with character-level highlighting")]
#[command(long_about = None)]
struct Cli {
    /// JSON file with diff options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a full comparison of two files
    Show {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        options: OptionArgs,

        /// One column instead of two
        #[arg(long)]
        inline: bool,

        /// Print an HTML fragment
        #[arg(long, conflicts_with = "json")]
        html: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Title of the base text (defaults to its path)
        #[arg(long)]
        base_name: Option<String>,

        /// Title of the new text (defaults to its path)
        #[arg(long)]
        new_name: Option<String>,
    },

    /// Print the alignment operations
    #[command(alias = "ops")]
    Opcodes {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        options: OptionArgs,

        /// Print operations and refinements as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print change statistics only
    Stat {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        options: OptionArgs,
    },
}

#[derive(Args)]
struct Inputs {
    /// Base (old) file
    base: PathBuf,

    /// New file
    new: PathBuf,
}

#[derive(Args)]
struct OptionArgs {
    /// Unchanged lines kept around changes (a number or "unbounded")
    #[arg(long, value_parser = parse_context)]
    context: Option<ContextSize>,

    /// Character making up one indentation level
    #[arg(long)]
    indent_char: Option<char>,

    /// Characters per indentation level
    #[arg(long)]
    indent_size: Option<usize>,

    /// Disable re-indentation detection
    #[arg(long, conflicts_with_all = ["indent_char", "indent_size"])]
    no_indent: bool,

    /// Disable character-level highlighting
    #[arg(long)]
    no_fuzzy: bool,
}

fn parse_context(value: &str) -> std::result::Result<ContextSize, String> {
    value.parse().map_err(|e: DiffError| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Disable colors if needed
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    // Run command
    if let Err(e) = run(cli) {
        let (message, code) = match e.downcast_ref::<DiffError>() {
            Some(err) if err.is_configuration() => (err.user_message(), 2),
            _ => (format!("{:#}", e), 1),
        };
        eprintln!("{}: {}", "Error".red().bold(), message);
        std::process::exit(code);
    }
}

/// Main command runner
fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Show {
            inputs,
            options,
            inline,
            html,
            json,
            base_name,
            new_name,
        } => {
            let differ = build_differ(cli.config.as_deref(), &options)?;
            let (base, new) = read_inputs(&inputs)?;
            let report = differ.report(&base, &new);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if html {
                let layout = if inline { Layout::Inline } else { Layout::SideBySide };
                let renderer = HtmlRenderer::new(layout).with_names(
                    base_name.unwrap_or_else(|| inputs.base.display().to_string()),
                    new_name.unwrap_or_else(|| inputs.new.display().to_string()),
                );
                println!("{}", renderer.render(&report));
            } else {
                println!("{} {}", "---".dimmed(), base_name.unwrap_or_else(|| inputs.base.display().to_string()).red());
                println!("{} {}", "+++".dimmed(), new_name.unwrap_or_else(|| inputs.new.display().to_string()).green());
                if inline {
                    print_inline(&report);
                } else {
                    print_side_by_side(&report);
                }
            }
            Ok(())
        }
        Commands::Opcodes { inputs, options, json } => {
            let differ = build_differ(cli.config.as_deref(), &options)?;
            let (base, new) = read_inputs(&inputs)?;
            let diff = differ.diff_text(&base, &new);

            if json {
                println!("{}", serde_json::to_string_pretty(&diff)?);
            } else {
                for op in &diff.operations {
                    println!("{}", op);
                }
            }
            Ok(())
        }
        Commands::Stat { inputs, options } => {
            let differ = build_differ(cli.config.as_deref(), &options)?;
            let (base, new) = read_inputs(&inputs)?;
            print_stats(&differ.report(&base, &new));
            Ok(())
        }
    }
}

/// Merge defaults, the optional config file and command-line flags
fn build_differ(config: Option<&Path>, args: &OptionArgs) -> Result<Differ> {
    let mut options = match config {
        Some(path) => {
            let raw = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str::<DiffOptions>(&raw).map_err(DiffError::from)?
        }
        None => DiffOptions::default(),
    };

    if let Some(context) = args.context {
        options.context_size = context;
    }
    if args.no_indent {
        options.indent_unit = None;
    } else if args.indent_char.is_some() || args.indent_size.is_some() {
        options.indent_unit =
            DiffOptions::indent_unit_from(args.indent_char.unwrap_or(' '), args.indent_size.unwrap_or(4));
    }
    if args.no_fuzzy {
        options.fuzzy_char_diff = false;
    }

    debug!("Effective options: {:?}", options);
    Ok(DifferBuilder::new().options(options).build()?)
}

fn read_inputs(inputs: &Inputs) -> Result<(String, String)> {
    Ok((read_text(&inputs.base)?, read_text(&inputs.new)?))
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = String::from_utf8(bytes).map_err(|source| DiffError::Utf8 {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text)
}

/// Color a marked line, highlighting its changed spans
fn paint(line: &MarkedLine, kind: OpKind) -> String {
    line.segments()
        .iter()
        .map(|segment| {
            let text = segment.text;
            match (kind, segment.changed) {
                (OpKind::Delete, _) => text.red().to_string(),
                (OpKind::Insert, _) => text.green().to_string(),
                (OpKind::Replace, true) => text.black().on_yellow().to_string(),
                (OpKind::Replace, false) => text.yellow().to_string(),
                (OpKind::Equal, _) => text.to_string(),
            }
        })
        .collect()
}

fn print_fold(lines: usize) {
    println!("{}", format!("@@ ... {} lines hidden @@", lines).cyan());
}

fn print_inline(report: &Report) {
    for row in &report.rows {
        match row {
            Row::Fold(fold) => print_fold(fold.lines),
            Row::Line(line) => print_inline_line(line),
        }
    }
}

fn print_inline_line(line: &LineRow) {
    let number = |cell: Option<&Cell>| cell.map_or(String::new(), |c| c.number.to_string());
    match line.kind {
        OpKind::Equal => {
            if let Some(cell) = &line.base {
                println!(
                    "{:>5} {:>5}   {}",
                    number(line.base.as_ref()).dimmed(),
                    number(line.new.as_ref()).dimmed(),
                    cell.text.text
                );
            }
        }
        OpKind::Delete | OpKind::Replace | OpKind::Insert => {
            if let Some(cell) = &line.base {
                let kind = if line.kind == OpKind::Replace { OpKind::Replace } else { OpKind::Delete };
                println!("{:>5} {:>5} {} {}", cell.number.to_string().dimmed(), "", "-".red(), paint(&cell.text, kind));
            }
            if let Some(cell) = &line.new {
                let kind = if line.kind == OpKind::Replace { OpKind::Replace } else { OpKind::Insert };
                println!("{:>5} {:>5} {} {}", "", cell.number.to_string().dimmed(), "+".green(), paint(&cell.text, kind));
            }
        }
    }
}

fn print_side_by_side(report: &Report) {
    let width = report
        .lines()
        .filter_map(|line| line.base.as_ref())
        .map(|cell| cell.text.text.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_COLUMN_WIDTH);

    for row in &report.rows {
        match row {
            Row::Fold(fold) => print_fold(fold.lines),
            Row::Line(line) => {
                let left = side(line.base.as_ref(), line.kind, width);
                let right = side(line.new.as_ref(), line.kind, 0);
                let marker = match line.kind {
                    OpKind::Equal => " ".normal(),
                    OpKind::Insert => ">".green(),
                    OpKind::Delete => "<".red(),
                    OpKind::Replace => "|".yellow(),
                };
                println!("{} {} {}", left, marker, right);
            }
        }
    }
}

/// One padded column of side-by-side output
fn side(cell: Option<&Cell>, kind: OpKind, width: usize) -> String {
    match cell {
        Some(cell) => {
            let visible = cell.text.text.chars().count();
            format!(
                "{:>5} {}{}",
                cell.number.to_string().dimmed(),
                paint(&cell.text, kind),
                " ".repeat(width.saturating_sub(visible))
            )
        }
        None => format!("{:>5} {}", "", " ".repeat(width)),
    }
}

fn print_stats(report: &Report) {
    let stats = &report.stats;
    if !stats.has_changes() {
        println!("{}", "Texts are identical".green());
        return;
    }

    println!("{}", "Summary:".bold());
    println!("  {} {} lines added", "+".green(), stats.lines_added.to_string().green());
    println!("  {} {} lines deleted", "-".red(), stats.lines_deleted.to_string().red());
    println!(
        "  {} {} lines modified ({} changed spans)",
        "~".yellow(),
        stats.lines_modified.to_string().yellow(),
        stats.char_spans
    );
    if stats.folds > 0 {
        println!("  {} unchanged lines hidden in {} folds", stats.lines_hidden, stats.folds);
    }
}
