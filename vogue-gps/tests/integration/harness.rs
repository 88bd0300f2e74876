//! Shared fixtures: a recording callback sink and mock-backed contexts

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use vogue_gps::{
    GpsCallbacks, GpsConfig, GpsInterface, GpsLocation, GpsStatusValue, MockControl, MockDevice,
    PollerState, SvStatus, VogueGps,
};

/// One raw-unit degree at correction factor 1.0
pub const DEG: i32 = 180_000;

pub const WAIT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub enum Event {
    Status(GpsStatusValue),
    Location(GpsLocation),
    SvStatus(SvStatus),
}

/// Callback sink that keeps every event in arrival order
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
    changed: Condvar,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
        self.changed.notify_all();
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn statuses(&self) -> Vec<GpsStatusValue> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Status(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn locations(&self) -> Vec<GpsLocation> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Location(l) => Some(*l),
                _ => None,
            })
            .collect()
    }

    pub fn sv_reports(&self) -> Vec<SvStatus> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::SvStatus(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    /// Block until at least `count` events satisfy `pred`
    pub fn wait_until<F>(&self, count: usize, timeout: Duration, pred: F) -> bool
    where
        F: Fn(&Event) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut events = self.events.lock();
        loop {
            if events.iter().filter(|e| pred(e)).count() >= count {
                return true;
            }
            if self.changed.wait_until(&mut events, deadline).timed_out() {
                return events.iter().filter(|e| pred(e)).count() >= count;
            }
        }
    }

    pub fn wait_locations(&self, count: usize) -> bool {
        self.wait_until(count, WAIT, |e| matches!(e, Event::Location(_)))
    }

    pub fn wait_sv_reports(&self, count: usize) -> bool {
        self.wait_until(count, WAIT, |e| matches!(e, Event::SvStatus(_)))
    }
}

impl GpsCallbacks for Recorder {
    fn status(&self, status: GpsStatusValue) {
        self.push(Event::Status(status));
    }

    fn location(&self, location: &GpsLocation) {
        self.push(Event::Location(*location));
    }

    fn sv_status(&self, sv_status: &SvStatus) {
        self.push(Event::SvStatus(sv_status.clone()));
    }
}

/// Defaults with a short wait slice so commands are picked up quickly
pub fn test_config() -> GpsConfig {
    let mut config = GpsConfig::default();
    config.polling.poll_slice_ms = 10;
    config
}

/// Initialized context around a fresh mock device
pub fn mock_gps(config: GpsConfig) -> (VogueGps<MockDevice>, MockControl, Arc<Recorder>) {
    env_logger::try_init().ok();

    let (device, control) = MockDevice::new();
    let gps = VogueGps::with_device(config, device);
    let recorder = Recorder::new();
    gps.init(recorder.clone()).unwrap();
    (gps, control, recorder)
}

/// Poll until the context reports `state`
pub fn wait_state(gps: &VogueGps<MockDevice>, state: PollerState) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if gps.state() == state {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    gps.state() == state
}
