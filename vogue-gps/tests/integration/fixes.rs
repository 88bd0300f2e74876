//! Fix delivery: decoding, kinematics, signal reports and one-shot mode

use super::harness::{DEG, mock_gps, test_config, wait_state};
use std::time::Duration;
use vogue_gps::core::types::DeviceInfo;
use vogue_gps::device::DeviceOp;
use vogue_gps::{
    FixRecord, GpsInterface, GpsStatusValue, LocationFlags, MockDevice, PollerState, VogueGps,
};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-3 * expected.abs().max(1.0),
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_first_fix_then_kinematics() {
    let (gps, control, recorder) = mock_gps(test_config());
    gps.start().unwrap();

    control.inject_fix(FixRecord::new(DEG, 2 * DEG, 10));
    assert!(recorder.wait_locations(1));
    control.inject_fix(FixRecord::new(DEG, DEG, 12));
    assert!(recorder.wait_locations(2));

    let locations = recorder.locations();
    let first = locations[0];
    assert!(first.flags.contains(LocationFlags::HAS_LAT_LONG));
    assert!(first.flags.contains(LocationFlags::HAS_ACCURACY));
    assert!(!first.flags.contains(LocationFlags::HAS_SPEED));
    assert!(!first.flags.contains(LocationFlags::HAS_BEARING));
    assert!(!first.flags.contains(LocationFlags::HAS_ALTITUDE));
    assert_close(first.latitude, 1.0);
    assert_close(first.longitude, 2.0);
    assert_eq!(first.accuracy, 3.0);
    assert_eq!(first.timestamp, 10);

    let second = locations[1];
    assert!(second.flags.contains(LocationFlags::HAS_SPEED));
    assert!(second.flags.contains(LocationFlags::HAS_BEARING));
    assert_close(f64::from(second.speed), 55_590.0);
    assert_close(f64::from(second.bearing), 90.0);
    assert_eq!(second.timestamp, 12);
}

#[test]
fn test_correction_factor_scales_coordinates() {
    let device = MockDevice::with_info(DeviceInfo {
        version: 1,
        correction_factor: 2.0,
    });
    let control = device.control();
    let gps = VogueGps::with_device(test_config(), device);
    let recorder = super::harness::Recorder::new();
    gps.init(recorder.clone()).unwrap();
    gps.start().unwrap();

    control.inject_fix(FixRecord::new(2 * DEG, -4 * DEG, 1));
    assert!(recorder.wait_locations(1));

    let location = recorder.locations()[0];
    assert_close(location.latitude, 1.0);
    assert_close(location.longitude, -2.0);
}

#[test]
fn test_repeated_timestamp_is_signal_only() {
    let (gps, control, recorder) = mock_gps(test_config());
    gps.start().unwrap();

    let sats = [(4, 30), (9, 25)];
    control.inject_fix(FixRecord::new(DEG, DEG, 5).with_satellites(&sats));
    control.inject_fix(FixRecord::new(DEG, DEG, 5).with_satellites(&sats[..1]));
    assert!(recorder.wait_sv_reports(2));

    assert_eq!(recorder.locations().len(), 1);
    let reports = recorder.sv_reports();
    assert_eq!(reports[0].num_svs(), 2);
    assert_eq!(reports[1].num_svs(), 1);
}

#[test]
fn test_satellite_report_precedes_location() {
    let (gps, control, recorder) = mock_gps(test_config());
    gps.start().unwrap();

    control.inject_fix(FixRecord::new(DEG, DEG, 1).with_satellites(&[(12, 40)]));
    assert!(recorder.wait_locations(1));

    let events = recorder.events();
    let sv_pos = events
        .iter()
        .position(|e| matches!(e, super::harness::Event::SvStatus(_)))
        .unwrap();
    let loc_pos = events
        .iter()
        .position(|e| matches!(e, super::harness::Event::Location(_)))
        .unwrap();
    assert!(sv_pos < loc_pos);

    let report = &recorder.sv_reports()[0];
    assert_eq!(report.sv_list[0].prn, 12);
    assert_eq!(report.sv_list[0].snr, 40.0);
}

#[test]
fn test_normalized_signal_units() {
    let mut config = test_config();
    config.signal.normalize = true;
    config.signal.full_scale = 64.0;
    let (gps, control, recorder) = mock_gps(config);
    gps.start().unwrap();

    control.inject_fix(FixRecord::new(DEG, DEG, 1).with_satellites(&[(3, 32), (5, 80)]));
    assert!(recorder.wait_sv_reports(1));

    let report = &recorder.sv_reports()[0];
    assert!((report.sv_list[0].snr - 0.5).abs() < 1e-6);
    assert_eq!(report.sv_list[1].snr, 1.0);
}

#[test]
fn test_short_read_is_skipped() {
    let (gps, control, recorder) = mock_gps(test_config());
    gps.start().unwrap();

    control.inject_raw(vec![0u8; 7]);
    control.inject_fix(FixRecord::new(DEG, DEG, 3));
    assert!(recorder.wait_locations(1));

    // The bad record produced no callback at all
    assert_eq!(recorder.sv_reports().len(), 1);
    assert_eq!(gps.state(), PollerState::Running);
    assert_eq!(control.count(DeviceOp::Read), 2);
}

#[test]
fn test_one_shot_delivers_single_fix() {
    let (gps, control, recorder) = mock_gps(test_config());
    gps.set_fix_frequency(0);
    gps.start().unwrap();

    control.inject_fix(FixRecord::new(DEG, DEG, 1));
    assert!(recorder.wait_locations(1));
    assert!(wait_state(&gps, PollerState::Idle));

    // Nothing is read while idle
    control.inject_fix(FixRecord::new(2 * DEG, DEG, 2));
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(recorder.locations().len(), 1);
    assert_eq!(control.pending(), 1);

    // Receiver stays on until an explicit stop
    assert_eq!(control.count(DeviceOp::Disable), 0);
    assert!(!recorder.statuses().contains(&GpsStatusValue::EngineOff));

    // A new start picks up the queued record, without kinematics or a second enable
    gps.start().unwrap();
    assert!(recorder.wait_locations(2));
    assert!(wait_state(&gps, PollerState::Idle));
    let second = recorder.locations()[1];
    assert!(!second.flags.contains(LocationFlags::HAS_SPEED));
    assert_eq!(control.count(DeviceOp::Enable), 1);
    assert_eq!(
        recorder.statuses(),
        vec![GpsStatusValue::SessionBegin, GpsStatusValue::SessionBegin]
    );

    gps.stop().unwrap();
    assert_eq!(control.count(DeviceOp::Disable), 1);
}

#[test]
fn test_stop_after_one_shot_disables_receiver() {
    let (gps, control, recorder) = mock_gps(test_config());
    gps.set_fix_frequency(0);
    gps.start().unwrap();

    control.inject_fix(FixRecord::new(DEG, DEG, 1));
    assert!(recorder.wait_locations(1));
    assert!(wait_state(&gps, PollerState::Idle));

    gps.stop().unwrap();
    assert_eq!(control.count(DeviceOp::Disable), 1);
    assert_eq!(
        recorder.statuses(),
        vec![GpsStatusValue::SessionBegin, GpsStatusValue::EngineOff]
    );

    // Receiver is off now, so further stops and cleanup do nothing more
    gps.stop().unwrap();
    gps.cleanup();
    assert_eq!(control.count(DeviceOp::Disable), 1);
    assert_eq!(
        control.ops(),
        vec![
            DeviceOp::QueryInfo,
            DeviceOp::Enable,
            DeviceOp::Read,
            DeviceOp::Disable
        ]
    );
}

#[test]
fn test_cleanup_after_one_shot_disables_receiver() {
    let (gps, control, recorder) = mock_gps(test_config());
    gps.set_fix_frequency(0);
    gps.start().unwrap();

    control.inject_fix(FixRecord::new(DEG, DEG, 1));
    assert!(recorder.wait_locations(1));
    assert!(wait_state(&gps, PollerState::Idle));

    gps.cleanup();
    assert!(control.is_closed());
    assert_eq!(control.count(DeviceOp::Disable), 1);
    assert_eq!(
        recorder.statuses(),
        vec![GpsStatusValue::SessionBegin, GpsStatusValue::EngineOff]
    );
}

#[test]
fn test_restart_resets_kinematics() {
    let (gps, control, recorder) = mock_gps(test_config());

    gps.start().unwrap();
    control.inject_fix(FixRecord::new(DEG, DEG, 1));
    assert!(recorder.wait_locations(1));
    gps.stop().unwrap();

    gps.start().unwrap();
    control.inject_fix(FixRecord::new(2 * DEG, DEG, 2));
    assert!(recorder.wait_locations(2));

    let second = recorder.locations()[1];
    assert!(!second.flags.contains(LocationFlags::HAS_SPEED));
    assert!(!second.flags.contains(LocationFlags::HAS_BEARING));
}

#[test]
fn test_origin_fix_does_not_seed_kinematics() {
    let (gps, control, recorder) = mock_gps(test_config());
    gps.start().unwrap();

    control.inject_fix(FixRecord::new(0, 0, 1));
    control.inject_fix(FixRecord::new(DEG, DEG, 2));
    assert!(recorder.wait_locations(2));

    let second = recorder.locations()[1];
    assert!(!second.flags.contains(LocationFlags::HAS_SPEED));
}
