// Mirrorboard CLI
// Grabs one keyboard and re-emits its events through the mirror layer

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use mirrorboard_core::output::VIRTUAL_DEVICE_NAME;
use mirrorboard_core::{
    ConfigError, DeviceInfo, EventLoop, MirrorConfig, MirrorTranslator, VirtualDevice,
};

/// How long a single poll waits before the shutdown flag is checked again
const POLL_TIMEOUT_MS: i32 = 100;

/// Momentary mirror layer for Linux keyboards
#[derive(Parser, Debug)]
#[command(name = "mirrorboard")]
#[command(version)]
#[command(about = "Hold the trigger key to type with a mirrored layout", long_about = None)]
struct Args {
    /// Index of the device to remap, as printed by --list-devices
    #[arg(value_name = "INDEX")]
    device_index: Option<usize>,

    /// Device node to remap instead of an index
    #[arg(short, long, value_name = "PATH", conflicts_with = "device_index")]
    device: Option<PathBuf>,

    /// Key that activates the mirror layer while held
    #[arg(short, long, value_name = "KEY", default_value = "SPACE")]
    trigger: String,

    /// Trigger holds shorter than this type the trigger key itself
    #[arg(long, value_name = "MS", default_value_t = 250)]
    burst_ms: u64,

    /// Wait before grabbing so the key that launched us is released
    #[arg(long, value_name = "MS", default_value_t = 500)]
    startup_delay_ms: u64,

    /// Validate the configuration, print the layout and exit
    #[arg(long)]
    check_config: bool,

    /// List available input devices
    #[arg(long)]
    list_devices: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn mirror_config(&self) -> Result<MirrorConfig, ConfigError> {
        Ok(MirrorConfig::default()
            .with_trigger_name(&self.trigger)?
            .with_burst_threshold(Duration::from_millis(self.burst_ms)))
    }

    fn has_device(&self) -> bool {
        self.device_index.is_some() || self.device.is_some()
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .init();
}

fn device_lines(devices: &[DeviceInfo]) -> Vec<String> {
    devices
        .iter()
        .map(|device| {
            let mut tags = Vec::new();
            if device.is_keyboard {
                tags.push("keyboard");
            }
            if device.name == VIRTUAL_DEVICE_NAME {
                tags.push("ours");
            }
            format!(
                "{}:\t{}\t{}\t{}\t{}",
                device.index,
                device.path.display(),
                device.name,
                device.phys.as_deref().unwrap_or("-"),
                tags.join(",")
            )
        })
        .collect()
}

fn list_devices() -> Result<()> {
    let devices = EventLoop::list_devices().context("Error finding input devices")?;
    for line in device_lines(&devices) {
        println!("{}", line);
    }
    Ok(())
}

fn print_layout(translator: &MirrorTranslator) {
    println!("Configuration is valid");
    println!("  trigger = {}", translator.trigger());
    println!("  burst threshold = {:?}", translator.burst_threshold());
    println!("  {} pairs:", translator.table().len());
    for (a, b) in translator.table().pairs() {
        println!("    {} <-> {}", a, b);
    }
}

fn open_input(args: &Args) -> Result<EventLoop> {
    match (&args.device, args.device_index) {
        (Some(path), _) => EventLoop::open_path(path)
            .with_context(|| format!("Failed to open {}", path.display())),
        (None, Some(index)) => {
            EventLoop::open(index).with_context(|| format!("Failed to open device {}", index))
        }
        (None, None) => anyhow::bail!("No device given; use --list-devices to pick one"),
    }
}

fn run(args: &Args, mut translator: MirrorTranslator) -> Result<()> {
    log::info!("Starting in {}ms", args.startup_delay_ms);
    std::thread::sleep(Duration::from_millis(args.startup_delay_ms));

    let mut input = open_input(args)?;
    let mut output = VirtualDevice::new().context("Failed to create virtual device")?;

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .context("Failed to install signal handler")?;
    }

    log::info!("Using device: {} ({})", input.name(), input.path().display());
    input.grab().context("Failed to grab device")?;

    let result = (|| -> Result<()> {
        while !shutdown.load(Ordering::SeqCst) {
            for event in input.poll_events(POLL_TIMEOUT_MS)? {
                let translation = translator.handle(event);
                if let Err(e) = output.emit(&translation.events) {
                    log::error!("Error sending output: {}", e);
                }
            }
        }
        Ok(())
    })();

    log::info!("Closing device: {}", input.name());
    if let Err(e) = output.release_all() {
        log::warn!("Failed to release held keys: {}", e);
    }
    input.ungrab();
    result
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list_devices || (!args.has_device() && !args.check_config) {
        return list_devices();
    }

    let translator =
        MirrorTranslator::new(args.mirror_config()?).context("Invalid configuration")?;

    if args.check_config {
        print_layout(&translator);
        return Ok(());
    }

    run(&args, translator)
}
