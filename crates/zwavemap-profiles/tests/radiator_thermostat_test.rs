//! End-to-end tests for the radiator thermostat profile: report decoding,
//! setpoint round trips, and the low-battery alarm edge.

use std::sync::Arc;

use zwavemap_codec::{CommandClass, ReportDispatcher};
use zwavemap_core::{CapabilityValue, DeviceId, EventBus, FieldMap, RecordingSink};
use zwavemap_profiles::radiator_thermostat;

fn dispatcher() -> (ReportDispatcher<RecordingSink>, RecordingSink) {
    let sink = RecordingSink::new();
    let dispatcher = ReportDispatcher::new(Arc::new(radiator_thermostat::profile()), sink.clone());
    (dispatcher, sink)
}

fn battery_report(raw: u8) -> FieldMap {
    FieldMap::new().with("Battery Level (Raw)", vec![raw])
}

#[test]
fn temperature_report_decodes_to_one_decimal() {
    let (dispatcher, _) = dispatcher();
    let device = DeviceId::new();

    let report = FieldMap::new()
        .with("Sensor Type", "Temperature (version 1)")
        .with("Sensor Value (Parsed)", 21.37);
    let decoded = dispatcher.on_report(
        &device,
        CommandClass::SensorMultilevel,
        "SENSOR_MULTILEVEL_REPORT",
        &report,
    );
    assert_eq!(
        decoded,
        Some((
            "measure_temperature".to_string(),
            CapabilityValue::Float(21.4)
        ))
    );
}

#[test]
fn setpoint_set_then_report_round_trips() {
    let (dispatcher, _) = dispatcher();
    let device = DeviceId::new();

    // 21.3 snaps to the device's half-degree grid
    let command = dispatcher
        .build_set("target_temperature", &CapabilityValue::Float(21.3))
        .unwrap();
    assert_eq!(command.command_class, CommandClass::ThermostatSetpoint);
    assert_eq!(command.command, "THERMOSTAT_SETPOINT_SET");
    assert_eq!(command.applied, CapabilityValue::Float(21.5));
    assert_eq!(command.fields.int_at("Level2.Size"), Some(2));
    assert_eq!(command.fields.int_at("Level2.Precision"), Some(1));
    assert_eq!(command.fields.bytes_at("Value"), Some(&[0x00, 0xD7][..]));

    // The device echoes the same layout back in its report
    let report = FieldMap::new()
        .with("Level", FieldMap::new().with("Setpoint Type", "Heating 1"))
        .with(
            "Level2",
            FieldMap::new()
                .with("Size", 2_i64)
                .with("Scale", 0_i64)
                .with("Precision", 1_i64),
        )
        .with("Value", command.fields.bytes_at("Value").unwrap().to_vec());
    let decoded = dispatcher.on_report(
        &device,
        CommandClass::ThermostatSetpoint,
        "THERMOSTAT_SETPOINT_REPORT",
        &report,
    );
    assert_eq!(
        decoded,
        Some(("target_temperature".to_string(), CapabilityValue::Float(21.5)))
    );
}

#[test]
fn setpoint_report_on_other_scale_is_ignored() {
    let (dispatcher, _) = dispatcher();
    let device = DeviceId::new();

    let report = FieldMap::new()
        .with(
            "Level2",
            FieldMap::new()
                .with("Size", 2_i64)
                .with("Scale", 1_i64)
                .with("Precision", 1_i64),
        )
        .with("Value", vec![0x02_u8, 0xD0]);
    assert_eq!(
        dispatcher.on_report(
            &device,
            CommandClass::ThermostatSetpoint,
            "THERMOSTAT_SETPOINT_REPORT",
            &report,
        ),
        None
    );
}

#[test]
fn battery_alarm_fires_on_each_transition_only() {
    let (dispatcher, sink) = dispatcher();
    let device = DeviceId::new();

    for raw in [50, 0xFF, 0xFF, 20, 0xFF] {
        dispatcher.on_report(
            &device,
            CommandClass::Battery,
            "BATTERY_REPORT",
            &battery_report(raw),
        );
    }
    assert_eq!(
        sink.names(),
        vec!["battery_alarm".to_string(), "battery_alarm".to_string()]
    );
}

#[test]
fn get_requests_carry_declared_fields() {
    let (dispatcher, _) = dispatcher();

    let get = dispatcher.build_get("measure_temperature").unwrap();
    assert_eq!(get.command, "SENSOR_MULTILEVEL_GET");
    assert_eq!(get.fields.str_at("Sensor Type"), Some("Temperature (version 1)"));
    assert_eq!(get.fields.int_at("Properties1.Scale"), Some(0));

    let get = dispatcher.build_get("target_temperature").unwrap();
    assert_eq!(get.fields.str_at("Level.Setpoint Type"), Some("Heating 1"));

    // Protection is write-only
    assert!(dispatcher.build_get("protected").is_none());
}

#[test]
fn protection_toggle_encodes_both_bytes() {
    let (dispatcher, _) = dispatcher();

    let on = dispatcher
        .build_set("protected", &CapabilityValue::Boolean(true))
        .unwrap();
    assert_eq!(on.command_class, CommandClass::Protection);
    assert_eq!(on.command, "PROTECTION_SET");
    assert_eq!(on.fields.bytes_at("Level"), Some(&[2_u8][..]));
    assert_eq!(on.fields.bytes_at("Level2"), Some(&[0_u8][..]));

    let off = dispatcher
        .build_set("protected", &CapabilityValue::Boolean(false))
        .unwrap();
    assert_eq!(off.fields.bytes_at("Level"), Some(&[0_u8][..]));
}

#[tokio::test]
async fn alarm_reaches_event_bus_subscribers() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let dispatcher = ReportDispatcher::new(Arc::new(radiator_thermostat::profile()), bus.clone());
    let device = DeviceId::new();

    dispatcher.on_report(
        &device,
        CommandClass::Battery,
        "BATTERY_REPORT",
        &battery_report(0xFF),
    );

    let (event, _) = rx.recv().await.unwrap();
    assert_eq!(event.name, "battery_alarm");
    assert_eq!(event.device_id, device);
}
