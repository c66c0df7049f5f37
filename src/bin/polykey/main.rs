//! polykey - play the computer keyboard like a piano
//!
//! Run with: cargo run -- --instrument bell

mod app;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::Polykey;
use polykey::io::{choose_device, list_output_devices};
use polykey::synth::InstrumentKind;
use polykey::{OutputSettings, SynthConfig};

#[derive(Debug, Parser)]
#[command(name = "polykey", version, about = "Polyphonic keyboard synthesizer")]
struct Cli {
    /// Output device (case-insensitive substring of its name)
    #[arg(short, long)]
    device: Option<String>,

    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,

    #[arg(long, default_value_t = 2)]
    channels: u16,

    /// Sample width: 8, 16 or 32 (float)
    #[arg(long, default_value_t = 16)]
    bit_depth: u16,

    #[arg(long, default_value_t = 8)]
    buffer_count: u32,

    /// Frames per device buffer
    #[arg(long, default_value_t = 512)]
    buffer_size: u32,

    /// Instrument the keyboard plays (bell, harmonica)
    #[arg(short, long, default_value = "bell")]
    instrument: InstrumentKind,

    /// Seed for the noise oscillator
    #[arg(long)]
    seed: Option<u64>,

    /// Print the output devices and exit
    #[arg(long)]
    list_devices: bool,
}

impl Cli {
    fn config(&self) -> SynthConfig {
        let output = OutputSettings {
            sample_rate: self.sample_rate,
            channels: self.channels,
            bit_depth: self.bit_depth,
            buffer_count: self.buffer_count,
            samples_per_buffer: self.buffer_size,
            device: self.device.clone(),
        };
        let config = SynthConfig::default().output(output).play_with(self.instrument);
        match self.seed {
            Some(seed) => config.seed(seed),
            None => config,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    config.validate()?;

    let host = cpal::default_host();
    let devices = list_output_devices(&host)?;
    for name in &devices {
        println!("[+] Found Output Device: {name}");
    }
    if cli.list_devices {
        return Ok(());
    }

    let device = &devices[choose_device(&devices, config.output.device.as_deref())?];
    println!("Using Device: {device}");

    Polykey::new(config, cli.instrument).run(&host, device)
}
