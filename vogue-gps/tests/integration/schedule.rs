//! Forced fix requests and the schedule window floor

use super::harness::{DEG, mock_gps, test_config};
use std::time::Duration;
use vogue_gps::device::DeviceOp;
use vogue_gps::{FixRecord, GpsInterface};

const FLOOR: Duration = Duration::from_millis(2000);

fn first_instant(ops: &[(DeviceOp, std::time::Instant)], op: DeviceOp) -> std::time::Instant {
    ops.iter()
        .find(|(o, _)| *o == op)
        .map(|(_, at)| *at)
        .unwrap()
}

#[test]
fn test_window_floor_under_interrupts() {
    let (gps, control, _recorder) = mock_gps(test_config());
    gps.set_fix_frequency(1500);
    control.set_interrupt_waits(Some(Duration::from_millis(5)));

    gps.start().unwrap();
    assert!(control.wait_for(DeviceOp::RequestNewFix, 1, Duration::from_secs(5)));

    let ops = control.timed_ops();
    let enabled = first_instant(&ops, DeviceOp::Enable);
    let requested = first_instant(&ops, DeviceOp::RequestNewFix);
    assert!(
        requested.duration_since(enabled) >= FLOOR,
        "new fix requested after {:?}",
        requested.duration_since(enabled)
    );
}

#[test]
fn test_forced_requests_repeat_without_fixes() {
    let (gps, control, _recorder) = mock_gps(test_config());
    gps.set_fix_frequency(1000);

    gps.start().unwrap();
    assert!(control.wait_for(DeviceOp::RequestNewFix, 2, Duration::from_secs(7)));

    let requests: Vec<_> = control
        .timed_ops()
        .into_iter()
        .filter(|(op, _)| *op == DeviceOp::RequestNewFix)
        .map(|(_, at)| at)
        .collect();
    assert!(requests[1].duration_since(requests[0]) >= FLOOR);
}

#[test]
fn test_new_fix_resets_window() {
    let (gps, control, recorder) = mock_gps(test_config());
    gps.set_fix_frequency(3000);

    gps.start().unwrap();
    std::thread::sleep(Duration::from_millis(1200));
    control.inject_fix(FixRecord::new(DEG, DEG, 1));
    assert!(recorder.wait_locations(1));
    assert!(control.wait_for(DeviceOp::RequestNewFix, 1, Duration::from_secs(5)));

    let ops = control.timed_ops();
    let read = first_instant(&ops, DeviceOp::Read);
    let requested = first_instant(&ops, DeviceOp::RequestNewFix);
    assert!(requested.duration_since(read) >= FLOOR);
}

#[test]
fn test_no_requests_while_idle() {
    let (gps, control, _recorder) = mock_gps(test_config());
    gps.set_fix_frequency(1000);

    gps.start().unwrap();
    gps.stop().unwrap();
    std::thread::sleep(Duration::from_millis(2300));

    assert_eq!(control.count(DeviceOp::RequestNewFix), 0);
}
