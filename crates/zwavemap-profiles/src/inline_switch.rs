//! In-wall relay switch with power measurement.
//!
//! Switch state uses the labeled `"on/enable"`/`"off/disable"` wire form.
//! Instantaneous power comes from the multilevel-sensor class, cumulative
//! energy from the meter class with a plain `"Properties2.Scale"` field.

use zwavemap_codec::{
    CapabilityBinding, CommandClass, DeviceProfile, ReportDecoder, SetEncoder, SettingDefinition,
};
use zwavemap_core::FieldMap;

pub const DEVICE_TYPE: &str = "inline_switch";

pub fn profile() -> DeviceProfile {
    let mut builder = DeviceProfile::builder(DEVICE_TYPE, "In-Wall Switch")
        .binding(
            CapabilityBinding::new("onoff", CommandClass::SwitchBinary)
                .with_get("SWITCH_BINARY_GET", FieldMap::new())
                .with_set("SWITCH_BINARY_SET", SetEncoder::BinarySwitchLabeled)
                .with_report("SWITCH_BINARY_REPORT", ReportDecoder::BinarySwitch),
        )
        .binding(
            CapabilityBinding::new("measure_power", CommandClass::SensorMultilevel)
                .with_get(
                    "SENSOR_MULTILEVEL_GET",
                    FieldMap::new()
                        .with("Sensor Type", "Power (version 2)")
                        .with("Properties1", FieldMap::new().with("Scale", 0_i64)),
                )
                .with_report(
                    "SENSOR_MULTILEVEL_REPORT",
                    ReportDecoder::MultilevelSensor {
                        sensor_type: "Power (version 2)".to_string(),
                        decimals: None,
                    },
                ),
        )
        .binding(
            CapabilityBinding::new("meter_power", CommandClass::Meter)
                .with_get(
                    "METER_GET",
                    FieldMap::new().with("Properties1", FieldMap::new().with("Scale", 0_i64)),
                )
                .with_report(
                    "METER_REPORT",
                    ReportDecoder::Meter {
                        scale_field: "Properties2.Scale".to_string(),
                        scale: 0,
                    },
                ),
        );

    // Manufacturer parameters 1-9, raw bytes.
    for index in 1..=9u8 {
        builder = builder.setting(SettingDefinition::new(format!("parameter_{index}"), index, 1));
    }
    builder.build()
}
