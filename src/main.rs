//! SparshaIO - Touch and stylus input daemon for IPTS devices

use clap::Parser;
use sparsha_io::app::TouchPipeline;
use sparsha_io::config::Config;
use sparsha_io::core::{DeviceSource, FileSource, LogSink};
use sparsha_io::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "sparsha-io", about = "Touch and stylus input daemon for IPTS devices")]
struct Args {
    /// Path of the configuration file
    #[arg(short, long, default_value = "/etc/sparshaio.toml")]
    config: String,

    /// Override the device path from the configuration
    #[arg(short, long)]
    device: Option<String>,
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("SparshaIO v0.3.0 starting...");

    let args = Args::parse();

    // Load configuration
    log::info!("Using config: {}", args.config);
    let mut config = Config::load(&args.config)?;

    if let Some(device) = args.device {
        config.device.path = device;
    }

    log::info!(
        "Device: {} (buffer size {})",
        config.device.path,
        config.device.buffer_size
    );

    let mut source = FileSource::open(&config.device.path, config.device.buffer_size)?;
    let mut pipeline = TouchPipeline::new(config.finder(), LogSink);

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);

    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    log::info!("SparshaIO running. Press Ctrl-C to stop.");

    let mut buffer = vec![0u8; config.device.buffer_size];

    // Main loop - one raw buffer at a time, end to end
    while running.load(Ordering::Relaxed) {
        let size = source.read_frame(&mut buffer)?;

        if size == 0 {
            log::info!("Device source exhausted");
            break;
        }

        pipeline.process(&buffer[..size]);
    }

    log::info!("SparshaIO stopped");
    Ok(())
}
