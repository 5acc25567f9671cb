use cyclebench::*;
use cyclebench::blinky::Blinky;

use anyhow::Context;
use clap::Parser;
use log::*;

/// Drive the built-in model for a fixed number of clock cycles and dump a VCD trace.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value_t = REFERENCE_CYCLES, value_parser = clap::value_parser!(u64).range(..=MAX_CYCLES))]
    cycles: u64,

    #[arg(short, long, default_value = REFERENCE_OUTPUT)]
    output: std::path::PathBuf,

    #[arg(long, default_value = "1us")]
    timescale: Timescale,

    /// Trace every element of the model's memories too.
    #[arg(long, default_value_t = false)]
    with_memories: bool,

    /// Big-endian 16-bit words to load into the model's ROM.
    #[arg(long)]
    rom: Option<std::path::PathBuf>,

    #[arg(long)]
    log_file: Option<std::path::PathBuf>,

    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut model = Blinky::new();
    if let Some(rom) = &args.rom {
        let data = std::fs::read(rom).with_context(|| format!("Couldn't load {}", rom.display()))?;
        info!("Loaded {} bytes of ROM from {}", data.len(), rom.display());
        model = model.with_rom(&data);
    }

    let filter = if args.with_memories { Filter::All } else { Filter::WithoutMemories };
    let driver = CycleDriver::new()
        .with_cycles(args.cycles)
        .with_timescale(args.timescale)
        .with_filter(filter);

    let summary = driver.run_to_file(model, VcdWriter::new(), &args.output)?;
    info!("{summary:?}");
    Ok(())
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    use chrono::{DateTime, Utc};

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let now: DateTime<Utc> = Utc::now();
            out.finish(format_args!(
                "[{} {} {}] {}",
                now.format("%Y-%m-%dT%H:%M:%S%.fZ"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    if let Some(log_file) = &args.log_file {
        dispatch = dispatch.chain(fern::log_file(log_file).with_context(|| format!("Couldn't open {}", log_file.display()))?);
    }

    let level = std::env::var("LEVEL").unwrap_or_default().to_string();

    if level == "TRACE" {
        dispatch = dispatch.level(log::LevelFilter::Trace);
    } else if level == "DEBUG" || args.debug {
        dispatch = dispatch.level(log::LevelFilter::Debug);
    } else {
        dispatch = dispatch.level(log::LevelFilter::Info);
    }

    dispatch.apply()?;
    Ok(())
}
