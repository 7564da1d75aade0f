use anyhow::{Context, Result};
use clap::Parser;
use iio_sens::config::AppConfig;
use iio_sens::sinks::{describe_event, ChannelSink, LogSink};
use iio_sens::{SensorInfo, SensorsHal};
use iio_sens_core::constants::NANOS_PER_SECOND;
use log::{info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// iio-sens - Motion sensor acquisition for Linux Industrial I/O devices
#[derive(Parser, Debug, Clone)]
#[command(name = "iio-sens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the one in the config directory
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// List discovered sensors and exit
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Print the sensor list as JSON (with --list)
    #[arg(long = "json", requires = "list")]
    json: bool,

    /// Print the debug dump and exit
    #[arg(long = "dump")]
    dump: bool,

    /// Only stream the named sensor (repeatable)
    #[arg(short = 's', long = "sensor", value_name = "NAME")]
    sensor: Vec<String>,

    /// Requested sampling rate in Hz
    #[arg(short = 'r', long = "rate", value_name = "HZ", default_value = "10")]
    rate: f64,

    /// Stop streaming after this many seconds (default: until Ctrl-C)
    #[arg(short = 't', long = "duration", value_name = "SECS")]
    duration: Option<f64>,

    /// Send events to the log at info level instead of stdout
    #[arg(long = "log-events")]
    log_events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Level 0 (default): warn only (quiet, shows only important === messages)
    // Level 1: info, 2: debug, 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    warn!("Starting iio-sens v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    let hal = SensorsHal::new(&config.hal).context("IIO device discovery failed")?;

    if cli.list {
        return list_sensors(&hal.sensors_list(), cli.json);
    }

    if cli.dump {
        let stdout = std::io::stdout();
        hal.debug_dump(&mut stdout.lock(), &[])?;
        return Ok(());
    }

    stream(hal, &cli).await
}

fn list_sensors(sensors: &[SensorInfo], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(sensors)?);
        return Ok(());
    }

    println!("Available sensors ({}):", sensors.len());
    println!();
    for info in sensors {
        println!("  [{}] {} ({})", info.sensor_handle, info.name, info.sensor_type);
        println!(
            "      delay {}..{} us, resolution {}, range {}",
            info.min_delay, info.max_delay, info.resolution, info.max_range
        );
    }
    Ok(())
}

async fn stream(hal: SensorsHal, cli: &Cli) -> Result<()> {
    anyhow::ensure!(cli.rate > 0.0, "Rate must be positive, got {}", cli.rate);

    let handles: Vec<i32> = hal
        .sensors_list()
        .into_iter()
        .filter(|info| cli.sensor.is_empty() || cli.sensor.contains(&info.name))
        .map(|info| info.sensor_handle)
        .collect();
    anyhow::ensure!(!handles.is_empty(), "No matching sensors to stream");

    let printer = if cli.log_events {
        hal.initialize(Arc::new(LogSink))?;
        None
    } else {
        let (sink, rx) = ChannelSink::new();
        hal.initialize(Arc::new(sink))?;

        // Prints until every sender is gone, i.e. until the HAL is dropped
        Some(std::thread::spawn(move || {
            let stdout = std::io::stdout();
            for batch in rx.iter() {
                let mut out = stdout.lock();
                for event in &batch.events {
                    let now = chrono::Local::now().format("%H:%M:%S%.3f");
                    if writeln!(out, "{} {}", now, describe_event(event)).is_err() {
                        return;
                    }
                }
            }
        }))
    };

    let period_ns = (NANOS_PER_SECOND / cli.rate) as i64;
    for &handle in &handles {
        hal.batch(handle, period_ns, 0)?;
        hal.activate(handle, true)?;
    }
    info!("Streaming {} sensors at {} Hz", handles.len(), cli.rate);

    let deadline = async {
        match cli.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs_f64(secs.max(0.0))).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            warn!("Interrupted, stopping");
        }
        _ = deadline => {
            info!("Run time elapsed, stopping");
        }
    }

    for &handle in &handles {
        if let Err(e) = hal.activate(handle, false) {
            warn!("Failed to disable sensor {}: {}", handle, e);
        }
    }
    drop(hal);

    if let Some(Err(e)) = printer.map(|p| p.join()) {
        warn!("Printer thread panicked: {:?}", e);
    }
    Ok(())
}
