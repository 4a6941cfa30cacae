//! PIR multi-sensor: contact, motion, tamper, luminance, temperature,
//! battery.
//!
//! The binary-sensor and multilevel-sensor command classes are shared by
//! several capabilities here; reports are multiplexed purely on their
//! `"Sensor Type"` discriminant. Motion clear additionally arrives as a
//! BASIC_SET with value 0. Parameter 5 packs three logical settings into
//! one byte on top of a fixed base.

use zwavemap_codec::{
    AlarmRule, CapabilityBinding, CommandClass, DeviceProfile, PackedBit, ReportDecoder,
    ReportRule, SettingDefinition, SettingEncoder,
};
use zwavemap_core::{CapabilityValue, FieldMap};

pub const DEVICE_TYPE: &str = "multi_sensor";

fn operation_mode_bits() -> SettingEncoder {
    SettingEncoder::PackedBits {
        base: 8,
        bits: vec![
            PackedBit::new("operation_mode", 0x01),
            PackedBit::new("test_mode", 0x02),
            PackedBit::new("door_window_mode", 0x04),
        ],
    }
}

pub fn profile() -> DeviceProfile {
    DeviceProfile::builder(DEVICE_TYPE, "PIR Multi-Sensor")
        .binding(
            CapabilityBinding::new("alarm_contact", CommandClass::SensorBinary).with_report(
                "SENSOR_BINARY_REPORT",
                ReportDecoder::BinarySensor {
                    sensor_type: "Door/Window".to_string(),
                },
            ),
        )
        .binding(
            CapabilityBinding::new("alarm_motion", CommandClass::SensorBinary).with_report(
                "SENSOR_BINARY_REPORT",
                ReportDecoder::BinarySensor {
                    sensor_type: "Motion".to_string(),
                },
            ),
        )
        .binding(
            CapabilityBinding::new("alarm_motion", CommandClass::Basic)
                .with_report("BASIC_SET", ReportDecoder::BasicClearOnly),
        )
        .binding(
            CapabilityBinding::new("alarm_tamper", CommandClass::SensorBinary)
                .with_get(
                    "SENSOR_BINARY_GET",
                    FieldMap::new().with("Sensor Type", "Tamper"),
                )
                .with_report(
                    "SENSOR_BINARY_REPORT",
                    ReportDecoder::BinarySensor {
                        sensor_type: "Tamper".to_string(),
                    },
                )
                .get_on_wake_up(),
        )
        .binding(
            CapabilityBinding::new("measure_luminance_level", CommandClass::SensorMultilevel)
                .with_report(
                    "SENSOR_MULTILEVEL_REPORT",
                    ReportDecoder::MultilevelSensor {
                        sensor_type: "Luminance (version 1)".to_string(),
                        decimals: None,
                    },
                ),
        )
        .binding(
            CapabilityBinding::new("measure_temperature", CommandClass::SensorMultilevel)
                .with_report(
                    "SENSOR_MULTILEVEL_REPORT",
                    ReportDecoder::MultilevelSensor {
                        sensor_type: "Temperature (version 1)".to_string(),
                        decimals: Some(1),
                    },
                ),
        )
        .binding(
            CapabilityBinding::new("measure_battery", CommandClass::Battery)
                .with_get("BATTERY_GET", FieldMap::new())
                .with_report("BATTERY_REPORT", ReportDecoder::BatteryLevel),
        )
        .alarm(AlarmRule::new(
            "measure_battery",
            CapabilityValue::Integer(1),
            "battery_alarm",
        ))
        // Automations key on every brightness report, not only changes.
        .report_event(ReportRule::new("measure_luminance_level", "brightness"))
        .setting(
            SettingDefinition::new("basic_set_level", 2, 1).with_encoder(
                SettingEncoder::SaturateAbove {
                    threshold: 100,
                    ceiling: 255,
                },
            ),
        )
        .setting(SettingDefinition::new("light_sensitivity", 4, 1))
        .setting(SettingDefinition::new("test_mode", 5, 1).with_encoder(operation_mode_bits()))
        .setting(SettingDefinition::new("operation_mode", 5, 1).with_encoder(operation_mode_bits()))
        .setting(
            SettingDefinition::new("door_window_mode", 5, 1).with_encoder(operation_mode_bits()),
        )
        // Multi-sensor function switch: base disables magnetic/PIR
        // integration, bit 64 adds temperature monitoring.
        .setting(
            SettingDefinition::new("temperature_monitoring", 6, 1)
                .with_encoder(SettingEncoder::FlagBit { base: 4, bit: 64 }),
        )
        // 8-second ticks
        .setting(
            SettingDefinition::new("turn_off_light_time", 9, 1)
                .with_encoder(SettingEncoder::ScaledTicks { divisor: 8.0 }),
        )
        // Half-minute units stored doubled
        .setting(
            SettingDefinition::new("battery_report_time", 10, 1)
                .with_encoder(SettingEncoder::ScaledTicks { divisor: 0.5 }),
        )
        .setting(
            SettingDefinition::new("contact_report_time", 11, 1)
                .with_encoder(SettingEncoder::ScaledTicks { divisor: 0.5 }),
        )
        .setting(
            SettingDefinition::new("illumination_report_time", 12, 1)
                .with_encoder(SettingEncoder::ScaledTicks { divisor: 0.5 }),
        )
        .setting(
            SettingDefinition::new("temperature_report_time", 13, 1)
                .with_encoder(SettingEncoder::ScaledTicks { divisor: 0.5 }),
        )
        .build()
}
