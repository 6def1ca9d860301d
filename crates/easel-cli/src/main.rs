//! Easel CLI: headless document tools.
//!
//! Runs the editor engine against the in-memory scene, so documents written
//! here are byte-identical to what the browser editor saves.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use easel_editor::{EditorConfig, ExportFormat};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Easel - create, normalize and export design documents
#[derive(Parser, Debug)]
#[command(name = "easel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Editor config file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a blank document with a single workspace
    New {
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-save a document in canonical form
    Normalize {
        document: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a document's workspace to an image
    Export {
        document: PathBuf,
        #[arg(short, long, value_enum, default_value = "png")]
        format: Format,
        /// Output file (defaults to the document name with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the workspace summary of a document
    Info { document: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Png,
    #[value(alias = "jpeg")]
    Jpg,
    Svg,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ExportFormat::Png,
            Format::Jpg => ExportFormat::Jpeg,
            Format::Svg => ExportFormat::Svg,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::New {
            width,
            height,
            output,
        } => {
            let json = commands::new_document(config, width, height)?;
            write_output(output.as_deref(), json.as_bytes())
        }
        Command::Normalize { document, output } => {
            let json = commands::normalize(config, &read_document(&document)?)?;
            write_output(output.as_deref(), json.as_bytes())
        }
        Command::Export {
            document,
            format,
            output,
        } => {
            let format = ExportFormat::from(format);
            let bytes = commands::export(config, &read_document(&document)?, format)?;
            let output = output.unwrap_or_else(|| document.with_extension(format.extension()));
            fs::write(&output, bytes)
                .with_context(|| format!("could not write {}", output.display()))?;
            log::info!("exported {}", output.display());
            Ok(())
        }
        Command::Info { document } => {
            let info = commands::info(&read_document(&document)?)?;
            println!("{info}");
            Ok(())
        }
    }
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("could not write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}
