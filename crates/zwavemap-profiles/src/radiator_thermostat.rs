//! Battery-powered radiator thermostat (Danfoss LC-13 class device).
//!
//! A sleepy device: every polled capability is requested at the wake-up
//! interval. The setpoint travels as a two-byte fixed-point value at
//! precision 1, and the device snaps targets to half degrees.

use std::time::Duration;

use zwavemap_codec::{
    AlarmRule, CapabilityBinding, CommandClass, DeviceProfile, ReportDecoder, SetEncoder,
};
use zwavemap_core::{CapabilityValue, FieldMap};

/// Device wake-up interval; polling is aligned to it so a sleepy device
/// answers the queued gets right after it checks in.
const WAKE_UP_INTERVAL: Duration = Duration::from_secs(1800);

pub const DEVICE_TYPE: &str = "radiator_thermostat";

pub fn profile() -> DeviceProfile {
    DeviceProfile::builder(DEVICE_TYPE, "Radiator Thermostat")
        .binding(
            CapabilityBinding::new("measure_battery", CommandClass::Battery)
                .with_get("BATTERY_GET", FieldMap::new())
                .with_report("BATTERY_REPORT", ReportDecoder::BatteryLevel)
                .with_poll_interval(WAKE_UP_INTERVAL),
        )
        .binding(
            CapabilityBinding::new("measure_temperature", CommandClass::SensorMultilevel)
                .with_get(
                    "SENSOR_MULTILEVEL_GET",
                    FieldMap::new()
                        .with("Sensor Type", "Temperature (version 1)")
                        .with("Properties1", FieldMap::new().with("Scale", 0_i64)),
                )
                .with_report(
                    "SENSOR_MULTILEVEL_REPORT",
                    ReportDecoder::MultilevelSensor {
                        sensor_type: "Temperature (version 1)".to_string(),
                        decimals: Some(1),
                    },
                )
                .with_poll_interval(WAKE_UP_INTERVAL),
        )
        .binding(
            CapabilityBinding::new("target_temperature", CommandClass::ThermostatSetpoint)
                .with_get(
                    "THERMOSTAT_SETPOINT_GET",
                    FieldMap::new()
                        .with("Level", FieldMap::new().with("Setpoint Type", "Heating 1")),
                )
                .with_report(
                    "THERMOSTAT_SETPOINT_REPORT",
                    ReportDecoder::Setpoint {
                        setpoint_type: "Heating 1".to_string(),
                        scale: 0,
                    },
                )
                .with_set(
                    "THERMOSTAT_SETPOINT_SET",
                    SetEncoder::Setpoint {
                        setpoint_type: "Heating 1".to_string(),
                        size: 2,
                        scale: 0,
                        precision: 1,
                        step: 0.5,
                    },
                )
                .with_poll_interval(WAKE_UP_INTERVAL),
        )
        // Child-lock toggle; not a configuration parameter but a dedicated
        // command class.
        .binding(
            CapabilityBinding::new("protected", CommandClass::Protection)
                .with_set("PROTECTION_SET", SetEncoder::Protection),
        )
        .alarm(AlarmRule::new(
            "measure_battery",
            CapabilityValue::Integer(1),
            "battery_alarm",
        ))
        .build()
}
