//! Sextant - explore and edit JSON, YAML and XML documents with paths
//!
//! ```text
//! sextant --input people.json read 'people.Tom.hobbies[-1]'
//! sextant --input people.yaml set people.Tom.age=69
//! sextant --input people.xml paths --value "value hasPrefix 'T'"
//! ```
#![allow(clippy::print_stdout)]

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use sextant_explorer::{ExplorerValue, PathsTarget};
use sextant_format::DataFormat;

mod commands;
mod logging;

use commands::{Output, Session};

#[derive(Parser, Debug)]
#[command(name = "sextant")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Document to read (stdin when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    input: Option<PathBuf>,

    /// Input format: json, yaml or xml (defaults to the input file extension, then json)
    #[arg(short, long, value_name = "FORMAT", env = "SEXTANT_FORMAT", global = true)]
    format: Option<DataFormat>,

    /// Output format (defaults to the input format)
    #[arg(
        short,
        long,
        value_name = "FORMAT",
        env = "SEXTANT_OUTPUT_FORMAT",
        global = true
    )]
    output_format: Option<DataFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value at one path, or the values at several paths merged into one document
    Read {
        #[arg(value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Replace values (`path=value`) and print the modified document
    Set {
        #[arg(value_name = "PATH=VALUE", required = true)]
        assignments: Vec<String>,
    },

    /// Insert values (`path=value`) and print the modified document
    Add {
        #[arg(value_name = "PATH=VALUE", required = true)]
        assignments: Vec<String>,
    },

    /// Delete values and print the modified document
    Delete {
        /// Also remove the containers left empty
        #[arg(long)]
        prune: bool,

        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,
    },

    /// List the paths of the document
    Paths {
        /// Keep paths whose last key fully matches this regular expression
        #[arg(long, value_name = "REGEX")]
        key: Option<String>,

        /// Keep single values satisfying this predicate
        #[arg(long, value_name = "PREDICATE")]
        value: Option<String>,

        #[arg(long, value_enum, default_value_t = Target::All)]
        target: Target,

        /// Only list paths below this one
        #[arg(value_name = "PATH")]
        start: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Target {
    Single,
    Group,
    All,
}

impl From<Target> for PathsTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::Single => PathsTarget::Single,
            Target::Group => PathsTarget::Group,
            Target::All => PathsTarget::All,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_json);

    let input_format = input_format(&cli);
    let output_format = cli.output_format.unwrap_or(input_format);
    let mut document = load(cli.input.as_ref(), input_format)?;

    let mut session = Session::new();
    let output = match &cli.command {
        Command::Read { paths } => session.read(&document, paths)?,
        Command::Set { assignments } => session.set(&mut document, assignments)?,
        Command::Add { assignments } => session.add(&mut document, assignments)?,
        Command::Delete { prune, paths } => session.delete(&mut document, paths, *prune)?,
        Command::Paths {
            key,
            value,
            target,
            start,
        } => session.paths(
            &document,
            start.as_deref(),
            key.as_deref(),
            value.as_deref(),
            (*target).into(),
        )?,
    };

    for (predicate, kinds) in session.take_mismatches() {
        let kinds: Vec<&str> = kinds.iter().map(|kind| kind.as_str()).collect();
        tracing::warn!(
            predicate = %predicate,
            kinds = %kinds.join(", "),
            "predicate skipped values it cannot compare"
        );
    }

    write_output(&output, output_format)
}

fn input_format(cli: &Cli) -> DataFormat {
    cli.format
        .or_else(|| {
            cli.input
                .as_ref()
                .and_then(|path| path.extension())
                .and_then(|extension| extension.to_str())
                .and_then(DataFormat::from_extension)
        })
        .unwrap_or_default()
}

fn load(input: Option<&PathBuf>, format: DataFormat) -> Result<ExplorerValue> {
    match input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            format
                .decode_reader(file)
                .with_context(|| format!("Failed to decode {} as {}", path.display(), format))
        }
        None => format
            .decode_reader(std::io::stdin().lock())
            .with_context(|| format!("Failed to decode stdin as {}", format)),
    }
}

fn write_output(output: &Output, format: DataFormat) -> Result<()> {
    let bytes = output.render(format)?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&bytes)
        .and_then(|_| stdout.flush())
        .context("Failed to write to stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_arguments() {
        let cli = Cli::try_parse_from([
            "sextant",
            "--input",
            "people.yml",
            "-vv",
            "delete",
            "--prune",
            "a.b",
            "c",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(input_format(&cli), DataFormat::Yaml);
        assert!(matches!(
            cli.command,
            Command::Delete { prune: true, ref paths } if paths.len() == 2
        ));
    }

    #[test]
    fn test_explicit_format_wins() {
        let cli = Cli::try_parse_from([
            "sextant", "-i", "doc.json", "-f", "xml", "-o", "yaml", "read",
        ])
        .unwrap();
        assert_eq!(input_format(&cli), DataFormat::Xml);
        assert_eq!(cli.output_format, Some(DataFormat::Yaml));

        assert!(Cli::try_parse_from(["sextant", "-f", "toml", "read"]).is_err());
        assert!(Cli::try_parse_from(["sextant", "set"]).is_err());
    }
}
