use anyhow::{Context, Result};
use clap::Parser;
use emu_core::logging::{log as core_log, LogCategory, LogConfig, LogLevel};
use emu_core::ppu::ShadeTable;
use emu_core::types::Frame;
use emu_gb::{GbBus, Interrupt, Ppu, PpuConfig, CYCLES_PER_FRAME};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

mod demo;
mod regs;

/// Drive the DMG PPU headlessly and save what it draws
#[derive(Parser)]
struct Args {
    /// PPU configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Upscale factor, overrides the config file
    #[arg(long)]
    scale: Option<u32>,

    /// Neutral gray shades instead of the default table
    #[arg(long, default_value_t = false)]
    grayscale: bool,

    /// Raw 8KB VRAM dump ($8000-$9FFF)
    #[arg(long)]
    vram: Option<PathBuf>,

    /// Raw 160-byte OAM dump ($FE00-$FE9F)
    #[arg(long)]
    oam: Option<PathBuf>,

    /// LCD registers (JSON)
    #[arg(long)]
    regs: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Cycles per tick, as a CPU instruction would hand them over
    #[arg(long, default_value_t = 4)]
    chunk: u32,

    /// Write the last completed frame as PNG
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Core log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "off")]
    log_level: String,

    /// Send core log output to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Core log messages allowed per second per category
    #[arg(long)]
    log_rate: Option<usize>,
}

#[derive(Debug, Default, Serialize)]
struct RunReport {
    frames: u64,
    cycles: u64,
    vblank_interrupts: u64,
    stat_interrupts: u64,
    scale: u32,
    width: u32,
    height: u32,
}

fn load_config(args: &Args) -> Result<PpuConfig> {
    let mut config = match &args.config {
        Some(path) => PpuConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PpuConfig::default(),
    };
    if let Some(scale) = args.scale {
        config.scale = scale;
        config.validate()?;
    }
    if args.grayscale {
        config.shades = ShadeTable::GRAYSCALE;
    }
    Ok(config)
}

fn load_bus(args: &Args) -> Result<GbBus> {
    if args.vram.is_none() && args.oam.is_none() && args.regs.is_none() {
        log::info!("No dumps given, using the demo scene");
        return Ok(demo::build());
    }

    let mut bus = GbBus::new();
    if let Some(path) = &args.vram {
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        bus.load_vram(&data)?;
    }
    if let Some(path) = &args.oam {
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        bus.load_oam(&data)?;
    }
    if let Some(path) = &args.regs {
        let json =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let regs = regs::RegisterFile::from_json(&json)
            .with_context(|| format!("parsing {}", path.display()))?;
        let count = regs.apply(&mut bus);
        log::debug!("Applied {} register(s) from {}", count, path.display());
    }
    Ok(bus)
}

fn run(ppu: &mut Ppu, bus: &mut GbBus, frames: u32, chunk: u32) -> RunReport {
    let mut report = RunReport::default();
    let total = CYCLES_PER_FRAME as u64 * frames as u64;

    while report.cycles < total {
        let step = (total - report.cycles).min(chunk as u64) as u32;
        let outcome = ppu.tick(step, bus);
        report.cycles += step as u64;
        if outcome.entered_vblank {
            core_log(LogCategory::Frontend, LogLevel::Info, || {
                format!("Frame {} at cycle {}", ppu.frame_count(), report.cycles)
            });
        }

        // Service interrupts the way a CPU with IME set would
        let pending = bus.take_interrupts();
        if pending & Interrupt::VBlank.mask() != 0 {
            report.vblank_interrupts += 1;
        }
        if pending & Interrupt::LcdStat.mask() != 0 {
            report.stat_interrupts += 1;
        }
    }

    report.frames = ppu.frame_count();
    report.scale = ppu.config().scale;
    report
}

fn write_png(path: &Path, frame: &Frame) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width, frame.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.to_rgba8())?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let level = LogLevel::from_str(&args.log_level)
        .with_context(|| format!("unknown log level '{}'", args.log_level))?;
    let logging = LogConfig::global();
    logging.set_global_level(level);
    if let Some(rate) = args.log_rate {
        logging.set_rate_limit(rate);
    }
    if let Some(path) = &args.log_file {
        logging
            .set_log_file(path.clone())
            .with_context(|| format!("opening log file {}", path.display()))?;
    }

    if args.chunk == 0 {
        anyhow::bail!("--chunk must be at least 1");
    }

    let config = load_config(&args)?;
    let mut bus = load_bus(&args)?;
    let mut ppu = Ppu::new(config)?;

    let mut report = run(&mut ppu, &mut bus, args.frames, args.chunk);
    let frame = ppu.front_frame();
    report.width = frame.width;
    report.height = frame.height;

    if let Some(path) = &args.out {
        write_png(path, frame)?;
        log::info!("Wrote {}x{} frame to {}", frame.width, frame.height, path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} frame(s), {} cycles: {} VBlank / {} LCD STAT interrupt(s), {}x{} at scale {}",
            report.frames,
            report.cycles,
            report.vblank_interrupts,
            report.stat_interrupts,
            report.width,
            report.height,
            report.scale
        );
    }

    Ok(())
}
