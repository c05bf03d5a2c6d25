use clap::{Parser, ValueEnum};
use log::info;
use merandom_core::{ByteSink, DeviceConfig, MeRandom, MiscRegistry, SessionHandle, WriterSink};
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

mod hex;
mod logger;

use hex::HexSink;

#[derive(Parser)]
#[command(name = "merandom")]
#[command(about = "Read bytes from a xorshift1024* pseudo-random device", long_about = None)]
struct Cli {
    /// Number of bytes to read
    #[arg(short = 'n', long, default_value_t = 1024)]
    bytes: usize,

    /// Read size per call (default: one read for everything)
    #[arg(short, long)]
    chunk: Option<usize>,

    /// Scratch buffer size in 64-bit words (overrides the config file)
    #[arg(short = 'w', long)]
    buffer_words: Option<usize>,

    /// Device config file (JSON)
    #[arg(long)]
    config: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "raw")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Raw,
    Hex,
}

fn load_config(cli: &Cli) -> Result<DeviceConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => DeviceConfig::from_json(&fs::read_to_string(path)?)?,
        None => DeviceConfig::default(),
    };
    if let Some(words) = cli.buffer_words {
        config.buffer_words = words;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli)?;

    let mut registry = MiscRegistry::new();
    let device = registry.register(config)?;
    let session = device.open()?;

    let chunk = cli.chunk.filter(|&c| c > 0).unwrap_or(cli.bytes.max(1));
    let stdout = io::stdout().lock();

    let result = match cli.format {
        OutputFormat::Raw => {
            let mut sink = WriterSink::new(stdout);
            read_all(&device, &session, cli.bytes, chunk, &mut sink).and_then(|_| {
                sink.into_inner().flush()?;
                Ok(())
            })
        }
        OutputFormat::Hex => {
            let mut sink = HexSink::new(stdout);
            read_all(&device, &session, cli.bytes, chunk, &mut sink)
                .and_then(|_| {
                    sink.finish()?;
                    Ok(())
                })
        }
    };

    info!("{}: read {} bytes", device.name(), cli.bytes);
    device.release(session)?;
    registry.deregister(device.name())?;
    result
}

fn read_all<S: ByteSink>(
    device: &MeRandom,
    session: &SessionHandle,
    total: usize,
    chunk: usize,
    sink: &mut S,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut remaining = total;
    while remaining > 0 {
        let len = remaining.min(chunk);
        device.read(session, len, sink)?;
        remaining -= len;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logger::init(cli.verbose) {
        eprintln!("Error: failed to install logger: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
