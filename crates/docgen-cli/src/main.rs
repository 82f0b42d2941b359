//! docgen - generate the standard library documentation table

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{debug, Level};

use docgen_core::{
    write_table, DocGenerator, DocRecord, DocgenConfig, HostRuntime, PythonHost, SnapshotHost,
};

/// Marker for standard output as the destination
const STDOUT_MARKER: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "docgen")]
#[command(version = docgen_core::VERSION)]
#[command(about = "Extract standard library documentation into a Rust table", long_about = None)]
struct Cli {
    /// Path to the target runtime's source tree
    runtime_root: PathBuf,

    /// Where to write the table (`-` for standard output)
    #[arg(default_value = STDOUT_MARKER)]
    output: PathBuf,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host interpreter command, overriding the configuration
    #[arg(long, value_name = "CMD")]
    python: Option<String>,

    /// Replay a recorded host snapshot instead of running the interpreter
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Record the host snapshot used for this run
    #[arg(long, value_name = "FILE")]
    dump_snapshot: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    run(cli)
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    // stdout may carry the table
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => DocgenConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DocgenConfig::default(),
    };
    if let Some(python) = cli.python {
        config.python = python;
    }

    let mut host: Box<dyn HostRuntime> = match &cli.snapshot {
        Some(path) => Box::new(
            SnapshotHost::from_path(path)
                .with_context(|| format!("failed to read snapshot {}", path.display()))?,
        ),
        None => Box::new(PythonHost::new(config.python.clone())),
    };

    let generator = DocGenerator::for_runtime_root(config, &cli.runtime_root)?;
    let generation = generator.generate(host.as_mut(), &mut io::stderr().lock())?;

    if let Some(path) = &cli.dump_snapshot {
        generation
            .snapshot
            .write_to(path)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        debug!(path = %path.display(), "recorded host snapshot");
    }

    write_output(&cli.output, &generation.records)
}

/// Write the table to `output`, replacing any existing file only once the
/// table is complete
fn write_output(output: &Path, records: &[DocRecord]) -> Result<()> {
    if output.as_os_str() == STDOUT_MARKER {
        let mut stdout = io::stdout().lock();
        write_table(&mut stdout, records)?;
        stdout.flush()?;
        return Ok(());
    }

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = io::BufWriter::new(file.as_file_mut());
        write_table(&mut writer, records)?;
        writer.flush()?;
    }
    file.persist(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    debug!(path = %output.display(), records = records.len(), "wrote table");
    Ok(())
}
