//! Tomasulo RV32I simulator CLI.
//!
//! This binary runs one program image and prints its exit code. It performs:
//! 1. **Configuration:** Built-in defaults, optionally a JSON file, then flag overrides.
//! 2. **Loading:** Reads the program image from `--image` or standard input.
//! 3. **Execution:** Runs the out-of-order core, or the reference interpreter with `--reference`.
//! 4. **Reporting:** Exit code on stdout; statistics with `--stats`; logs on stderr.

use clap::Parser;
use std::path::PathBuf;
use std::{fs, io, process};
use tracing_subscriber::EnvFilter;

use tomasulo_core::config::Config;
use tomasulo_core::sim::{Interpreter, ProgramImage, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Cycle-accurate Tomasulo RV32I simulator",
    long_about = "Run a program image on an out-of-order RV32I core and print the exit code.\n\nThe image format is `@<hex address>` followed by hex bytes. Logging is controlled by RUST_LOG.\n\nExamples:\n  sim --image prog.data\n  sim --shuffle --seed 7 --stats < prog.data\n  sim --reference --image prog.data"
)]
struct Cli {
    /// Program image; read from stdin when omitted.
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after N cycles with exit code 255 (0 = unlimited).
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Shuffle unit evaluation order every tick.
    #[arg(long)]
    shuffle: bool,

    /// Seed for --shuffle.
    #[arg(long)]
    seed: Option<u64>,

    /// Print statistics after the run.
    #[arg(long)]
    stats: bool,

    /// Run the sequential reference interpreter instead of the core.
    #[arg(long)]
    reference: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => println!("{code}"),
        Err(e) => {
            eprintln!("[!] FATAL: {e}");
            process::exit(1);
        }
    }
}

/// Builds the configuration: file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config: Config = match &cli.config {
        Some(path) => serde_json::from_reader(io::BufReader::new(fs::File::open(path)?))?,
        None => Config::default(),
    };
    if let Some(n) = cli.max_cycles {
        config.general.max_cycles = n;
    }
    if cli.shuffle {
        config.general.shuffle = true;
    }
    if let Some(seed) = cli.seed {
        config.general.shuffle_seed = seed;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<u8, Box<dyn std::error::Error>> {
    let config = load_config(cli)?;
    let image = match &cli.image {
        Some(path) => ProgramImage::from_file(path)?,
        None => ProgramImage::from_reader(io::stdin().lock())?,
    };
    tracing::debug!(bytes = image.len(), blocks = image.segments.len(), "image loaded");

    if cli.reference {
        let ram = image.to_ram(config.memory.size_bytes);
        let mut interp = Interpreter::new(ram, config.general.start_pc);
        let code = interp.run(config.general.max_cycles)?;
        if cli.stats {
            println!("instructions retired: {}", interp.retired());
        }
        return Ok(code);
    }

    let mut sim = Simulator::new(&config, &image);
    let code = sim.run()?;
    if cli.stats {
        sim.stats().print();
    }
    Ok(code)
}
