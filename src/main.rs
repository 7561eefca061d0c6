//! Cellgraph - reactive cell engine on the command line

mod config;

use anyhow::{Context, Result, bail};
use cellgraph_core::Document;
use cellgraph_core::storage::{read_snapshot, write_snapshot};
use cellgraph_engine::engine::{
    CellValue, SelfReference, format_number, format_value, substitute_and_eval,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cellgraph")]
#[command(author, version, about = "Reactive cell engine: formulas, dependencies, propagation")]
struct Cli {
    /// Decimal places for non-integer values (overrides config)
    #[arg(long, global = true)]
    decimals: Option<usize>,

    /// Treat a formula that references its own cell as circular
    #[arg(long, global = true)]
    strict_self_reference: bool,

    /// Config file to use instead of the user config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a standalone formula (leading '=' optional); cell
    /// references read as empty cells
    Calc {
        /// Expression, e.g. "(1 + 2) * 3"
        expr: String,
    },

    /// Print every stored cell with its raw input and value
    Show {
        /// Sheet file (.grd or .json)
        file: PathBuf,
    },

    /// Print the value of one or more cells
    Get {
        /// Sheet file (.grd or .json)
        file: PathBuf,

        /// Cell identifiers, e.g. A1
        #[arg(required = true)]
        cells: Vec<String>,
    },

    /// Apply "ID: RAW" assignments in order and save the file
    Set {
        /// Sheet file (.grd or .json); created if missing
        file: PathBuf,

        /// Assignments, e.g. "A1: 10" or "C1: =A1 * 2"
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Rewrite a sheet file in another format (by extension)
    Convert {
        /// Input sheet file
        input: PathBuf,

        /// Output sheet file
        output: PathBuf,
    },
}

/// Settings resolved from config file and flags.
struct Settings {
    decimals: usize,
    self_reference: SelfReference,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (config, warnings) = config::load_config(cli.config.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    let settings = Settings {
        decimals: cli.decimals.unwrap_or(config.decimals),
        self_reference: if cli.strict_self_reference {
            SelfReference::Circular
        } else {
            config.self_reference
        },
    };

    match cli.command {
        Commands::Calc { expr } => calc(&expr, &settings),
        Commands::Show { file } => show(&file, &settings),
        Commands::Get { file, cells } => get(&file, &cells, &settings),
        Commands::Set { file, assignments } => set(&file, &assignments, &settings),
        Commands::Convert { input, output } => convert(&input, &output),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn open(file: &Path, settings: &Settings) -> Result<Document> {
    if !file.exists() {
        bail!("File not found: {}", file.display());
    }
    Document::with_file(Some(file.to_path_buf()), settings.self_reference)
        .with_context(|| format!("Failed to open '{}'", file.display()))
}

fn calc(expr: &str, settings: &Settings) -> Result<()> {
    let trimmed = expr.trim();
    let body = trimmed.strip_prefix('=').unwrap_or(trimmed);

    // No sheet backs the expression, so every reference is an empty cell.
    match substitute_and_eval(body, |_| CellValue::empty()) {
        Ok(n) => {
            println!("{}", format_number(n, settings.decimals));
            Ok(())
        }
        Err(err) => {
            log::debug!("calc failed: {}", err);
            println!("#ERROR!");
            std::process::exit(1);
        }
    }
}

fn show(file: &Path, settings: &Settings) -> Result<()> {
    let doc = open(file, settings)?;
    if doc.sheet.is_empty() {
        eprintln!("Warning: Sheet is empty");
        return Ok(());
    }

    let width = doc
        .sheet
        .iter()
        .map(|(_, cell)| cell.raw.chars().count())
        .max()
        .unwrap_or(0);
    for (id, cell) in doc.sheet.iter() {
        println!(
            "{:<6}  {:<width$}  {}",
            id,
            cell.raw,
            format_value(&cell.value, settings.decimals),
            width = width
        );
    }
    Ok(())
}

fn get(file: &Path, cells: &[String], settings: &Settings) -> Result<()> {
    let doc = open(file, settings)?;
    for cell in cells {
        let display = doc
            .get_cell_display(cell, settings.decimals)
            .with_context(|| format!("Failed to read cell '{}'", cell))?;
        println!("{}", display);
    }
    Ok(())
}

fn set(file: &Path, assignments: &[String], settings: &Settings) -> Result<()> {
    let mut doc = Document::with_file(Some(file.to_path_buf()), settings.self_reference)
        .with_context(|| format!("Failed to open '{}'", file.display()))?;

    for assignment in assignments {
        let Some((cell, raw)) = assignment.split_once(':') else {
            bail!("Invalid assignment '{}': expected \"ID: RAW\"", assignment);
        };
        let cell = cell.trim();
        let raw = raw.trim_start();

        let report = doc
            .set_cell_from_input(cell, raw)
            .with_context(|| format!("Failed to set '{}'", cell))?;
        println!(
            "{} = {}",
            cell.to_ascii_uppercase(),
            doc.get_cell_display(cell, settings.decimals)?
        );
        for id in report.touched() {
            println!(
                "  {} = {}",
                id,
                format_value(&doc.sheet.get_cell(&id), settings.decimals)
            );
        }
    }

    let saved = doc
        .save_file()
        .with_context(|| format!("Failed to save '{}'", file.display()))?;
    eprintln!("Saved {}", saved.display());
    Ok(())
}

fn convert(input: &Path, output: &Path) -> Result<()> {
    let snapshot =
        read_snapshot(input).with_context(|| format!("Failed to read '{}'", input.display()))?;
    write_snapshot(output, &snapshot)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    eprintln!(
        "Converted {} cell(s): {} -> {}",
        snapshot.len(),
        input.display(),
        output.display()
    );
    Ok(())
}
