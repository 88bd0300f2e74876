//! vogue-gps-monitor - run a GPS session and log every callback
//!
//! Usage: `vogue-gps-monitor [--config <path> | <path>]`
//!
//! With `device.mock = true` a feeder thread injects a synthetic track into
//! the in-memory device instead of opening `/dev/vogue_gps`.

use std::env;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use vogue_gps::device::constants::COORDINATE_SCALE;
use vogue_gps::{
    Error, FixRecord, GpsConfig, GpsDevice, GpsInterface, LoggingCallbacks, MockControl,
    MockDevice, Result, VogueGps,
};

const DEFAULT_CONFIG_PATH: &str = "/etc/vogue-gps.toml";

/// Interval between synthetic fixes in mock mode
const MOCK_FIX_PERIOD: Duration = Duration::from_secs(1);

/// Parse config path from command line arguments.
///
/// Supports:
/// - `vogue-gps-monitor <path>` (positional)
/// - `vogue-gps-monitor --config <path>` (flag-based)
/// - `vogue-gps-monitor -c <path>` (short flag)
///
/// Returns `None` if no path was given.
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

/// Load the given config, or the default file if present, or built-in defaults
fn load_config() -> Result<(GpsConfig, String)> {
    match parse_config_path() {
        Some(path) => Ok((GpsConfig::from_file(&path)?, path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Ok((
            GpsConfig::from_file(DEFAULT_CONFIG_PATH)?,
            DEFAULT_CONFIG_PATH.to_string(),
        )),
        None => Ok((GpsConfig::default(), "<built-in defaults>".to_string())),
    }
}

/// Inject a slow north-east walk with a fixed constellation
fn spawn_mock_feeder(control: MockControl, running: Arc<AtomicBool>) -> Result<()> {
    thread::Builder::new()
        .name("mock-feeder".to_string())
        .spawn(move || {
            let base_lat = (37.0 * COORDINATE_SCALE) as i32;
            let base_lng = (-122.0 * COORDINATE_SCALE) as i32;
            let satellites = [(3, 38), (7, 41), (12, 29), (19, 35), (24, 22)];
            let mut tick: u32 = 1;

            while running.load(Ordering::Relaxed) && !control.is_closed() {
                let step = tick as i32 * 18;
                control.inject_fix(
                    FixRecord::new(base_lat + step, base_lng + step, tick)
                        .with_satellites(&satellites),
                );
                tick = tick.wrapping_add(1);
                thread::sleep(MOCK_FIX_PERIOD);
            }
            log::debug!("Mock feeder stopped");
        })
        .map_err(|e| Error::Other(format!("Failed to spawn mock feeder: {}", e)))?;
    Ok(())
}

/// Drive one session until `running` is cleared
fn run_session<D: GpsDevice>(gps: &VogueGps<D>, running: &AtomicBool) -> Result<()> {
    gps.init(Arc::new(LoggingCallbacks))?;
    gps.start()?;

    log::info!("Vogue GPS monitor running. Press Ctrl-C to stop.");
    while running.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_millis(100));
    }

    log::info!("Shutting down...");
    gps.stop()?;
    gps.cleanup();
    Ok(())
}

fn main() -> Result<()> {
    let (config, source) = load_config()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Vogue GPS monitor v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!("Using config: {}", source);

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let interval = config.polling.fix_interval_ms;

    if config.device.mock {
        log::info!("Device: in-memory mock");
        let (device, control) = MockDevice::new();
        let gps = VogueGps::with_device(config, device);
        gps.set_fix_frequency(interval);
        spawn_mock_feeder(control, Arc::clone(&running))?;
        run_session(&gps, &running)?;
    } else {
        log::info!("Device: {}", config.device.path);
        let gps = VogueGps::open(config);
        gps.set_fix_frequency(interval);
        run_session(&gps, &running)?;
    }

    log::info!("Vogue GPS monitor stopped");
    Ok(())
}
