use std::{
    fs,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use serde::Serialize;
use thiserror::Error;

use vcoin_ledger::{
    ConfigError, EventRecord, GenesisConfig, Ledger, Operation, Outcome, Rejection,
};

/// Exit status when an operation aborted and `--keep-going` was not given.
const EXIT_ABORTED: i32 = 1;
/// Exit status for config, IO and script errors.
const EXIT_FAILURE: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "vcoin")]
#[command(about = "Replay token operations against an in-memory VCoin ledger", long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print token metadata as JSON
    Info {
        /// Genesis config (JSON); the reference token when omitted
        #[arg(long)]
        genesis: Option<PathBuf>,
    },
    /// Apply a JSON-lines operation script and print one result per line
    Replay {
        /// Operation script, one JSON object per line ('#' starts a comment)
        #[arg(long)]
        ops: PathBuf,

        #[arg(long)]
        genesis: Option<PathBuf>,

        /// Record hard aborts and continue instead of stopping
        #[arg(long, default_value_t = false)]
        keep_going: bool,

        /// Print the final snapshot after the last operation
        #[arg(long, default_value_t = false)]
        snapshot: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{}: {source}", path.display())]
    Config { path: PathBuf, source: ConfigError },

    #[error("genesis: {0}")]
    Genesis(#[from] ConfigError),

    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{source_name}:{line}: {source}")]
    Script {
        source_name: String,
        line: usize,
        source: serde_json::Error,
    },

    #[error("output: {0}")]
    Output(#[from] io::Error),

    #[error("output: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Report<'a> {
    Committed { line: usize, event: &'a EventRecord },
    Rejected { line: usize, rejection: &'a Rejection },
    Aborted { line: usize, error: String },
}

#[derive(Serialize)]
struct Info<'a> {
    name: &'a str,
    symbol: &'a str,
    decimals: u8,
    total_supply: u64,
    genesis_account: &'a str,
}

fn load_genesis(path: Option<&Path>) -> Result<GenesisConfig, CliError> {
    match path {
        Some(p) => GenesisConfig::from_json_file(p).map_err(|source| CliError::Config {
            path: p.to_path_buf(),
            source,
        }),
        None => Ok(GenesisConfig::default()),
    }
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<(), CliError> {
    let line = serde_json::to_string(value)?;
    writeln!(out, "{line}")?;
    Ok(())
}

/// Parses a JSON-lines script. Blank lines and `#` comments are skipped;
/// the returned line numbers are 1-based positions in the source.
fn read_ops(reader: impl BufRead, source_name: &str) -> Result<Vec<(usize, Operation)>, CliError> {
    let mut ops = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::Io {
            path: PathBuf::from(source_name),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let op: Operation = serde_json::from_str(trimmed).map_err(|source| CliError::Script {
            source_name: source_name.to_string(),
            line: idx + 1,
            source,
        })?;
        ops.push((idx + 1, op));
    }
    Ok(ops)
}

/// Applies `ops` in order, writing one report line each. Returns the exit
/// status: `EXIT_ABORTED` if an abort stopped the run, 0 otherwise.
fn replay(
    ledger: &mut Ledger,
    ops: &[(usize, Operation)],
    out: &mut impl Write,
    keep_going: bool,
    snapshot: bool,
) -> Result<i32, CliError> {
    let mut aborted = 0usize;
    for (line, op) in ops {
        match ledger.apply(op) {
            Ok(Outcome::Committed(record)) => {
                print_json(out, &Report::Committed { line: *line, event: &record })?
            }
            Ok(Outcome::Rejected(rejection)) => print_json(
                out,
                &Report::Rejected {
                    line: *line,
                    rejection: &rejection,
                },
            )?,
            Err(err) => {
                aborted += 1;
                print_json(
                    out,
                    &Report::Aborted {
                        line: *line,
                        error: err.to_string(),
                    },
                )?;
                if !keep_going {
                    break;
                }
            }
        }
    }

    if snapshot {
        print_json(out, &ledger.snapshot())?;
    }
    info!(
        "{} events committed, {} aborted, state root {}",
        ledger.events().len(),
        aborted,
        hex::encode(ledger.state_root())
    );

    Ok(if aborted > 0 && !keep_going { EXIT_ABORTED } else { 0 })
}

fn info_cmd(genesis: Option<&Path>, out: &mut impl Write) -> Result<i32, CliError> {
    let config = load_genesis(genesis)?;
    let ledger = Ledger::genesis(&config)?;
    let info = Info {
        name: ledger.name(),
        symbol: ledger.symbol(),
        decimals: ledger.decimals(),
        total_supply: ledger.total_supply(),
        genesis_account: &config.genesis_account,
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
    Ok(0)
}

fn replay_cmd(
    ops_path: &Path,
    genesis: Option<&Path>,
    keep_going: bool,
    snapshot: bool,
    out: &mut impl Write,
) -> Result<i32, CliError> {
    let config = load_genesis(genesis)?;
    let mut ledger = Ledger::genesis(&config)?;
    let file = fs::File::open(ops_path).map_err(|source| CliError::Io {
        path: ops_path.to_path_buf(),
        source,
    })?;
    let ops = read_ops(BufReader::new(file), &ops_path.display().to_string())?;
    info!("replaying {} operations from {}", ops.len(), ops_path.display());
    replay(&mut ledger, &ops, out, keep_going, snapshot)
}

fn run(command: Command, out: &mut impl Write) -> Result<i32, CliError> {
    match command {
        Command::Info { genesis } => info_cmd(genesis.as_deref(), out),
        Command::Replay {
            ops,
            genesis,
            keep_going,
            snapshot,
        } => replay_cmd(&ops, genesis.as_deref(), keep_going, snapshot, out),
    }
}

fn exit_code(result: Result<i32, CliError>) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            EXIT_FAILURE
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = exit_code(run(cli.command, &mut out));
    process::exit(code)
}
