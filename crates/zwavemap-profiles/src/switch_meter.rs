//! Plug-in switch with power and energy metering.
//!
//! The meter command class carries both instantaneous power and cumulative
//! energy; the two capabilities share METER_REPORT and are told apart only
//! by the scale bits in the report. Watt and kWh report intervals are each
//! gated by an enable flag living at the same parameter index.

use zwavemap_codec::{
    CapabilityBinding, CommandClass, DeviceProfile, ReportDecoder, SetEncoder, SettingDefinition,
    SettingEncoder,
};
use zwavemap_core::FieldMap;

pub const DEVICE_TYPE: &str = "switch_meter";

pub fn profile() -> DeviceProfile {
    DeviceProfile::builder(DEVICE_TYPE, "Metering Plug-in Switch")
        .binding(
            CapabilityBinding::new("onoff", CommandClass::SwitchBinary)
                .with_set("SWITCH_BINARY_SET", SetEncoder::BinarySwitch),
        )
        // State reads back through the basic command class on this firmware.
        .binding(
            CapabilityBinding::new("onoff", CommandClass::Basic)
                .with_get("BASIC_GET", FieldMap::new())
                .with_report("BASIC_REPORT", ReportDecoder::BasicOnOff),
        )
        .binding(
            CapabilityBinding::new("measure_power", CommandClass::Meter)
                .with_get(
                    "METER_GET",
                    FieldMap::new()
                        .with("Sensor Type", "Electric meter")
                        .with("Properties1", FieldMap::new().with("Scale", 0_i64)),
                )
                .with_report(
                    "METER_REPORT",
                    ReportDecoder::Meter {
                        scale_field: "Properties2.Scale bits 10".to_string(),
                        scale: 2,
                    },
                ),
        )
        .binding(
            CapabilityBinding::new("meter_power", CommandClass::Meter)
                .with_get(
                    "METER_GET",
                    FieldMap::new()
                        .with("Sensor Type", "Electric meter")
                        .with("Properties1", FieldMap::new().with("Scale", 2_i64)),
                )
                .with_report(
                    "METER_REPORT",
                    ReportDecoder::Meter {
                        scale_field: "Properties2.Scale bits 10".to_string(),
                        scale: 0,
                    },
                ),
        )
        .setting(
            SettingDefinition::new("enable_watt_meter_report", 1, 2).with_encoder(
                SettingEncoder::GatedInterval {
                    enable: "enable_watt_meter_report".to_string(),
                    period: "watt_meter_report_period".to_string(),
                    divisor: 5.0,
                },
            ),
        )
        .setting(
            SettingDefinition::new("watt_meter_report_period", 1, 2).with_encoder(
                SettingEncoder::GatedInterval {
                    enable: "enable_watt_meter_report".to_string(),
                    period: "watt_meter_report_period".to_string(),
                    divisor: 5.0,
                },
            ),
        )
        .setting(
            SettingDefinition::new("enable_kwh_meter_report", 2, 2).with_encoder(
                SettingEncoder::GatedInterval {
                    enable: "enable_kwh_meter_report".to_string(),
                    period: "kwh_meter_report_period".to_string(),
                    divisor: 10.0,
                },
            ),
        )
        .setting(
            SettingDefinition::new("kwh_meter_report_period", 2, 2).with_encoder(
                SettingEncoder::GatedInterval {
                    enable: "enable_kwh_meter_report".to_string(),
                    period: "kwh_meter_report_period".to_string(),
                    divisor: 10.0,
                },
            ),
        )
        // Amps scaled to centiamps on the wire
        .setting(
            SettingDefinition::new("threshold_of_current_for_load_caution", 3, 2)
                .with_encoder(SettingEncoder::ScaledTicks { divisor: 0.01 }),
        )
        .setting(
            SettingDefinition::new("enable_kwh_for_load_caution", 4, 2).with_encoder(
                SettingEncoder::GatedInterval {
                    enable: "enable_kwh_for_load_caution".to_string(),
                    period: "threshold_of_kwh_for_load_caution".to_string(),
                    divisor: 1.0,
                },
            ),
        )
        .setting(
            SettingDefinition::new("threshold_of_kwh_for_load_caution", 4, 2).with_encoder(
                SettingEncoder::GatedInterval {
                    enable: "enable_kwh_for_load_caution".to_string(),
                    period: "threshold_of_kwh_for_load_caution".to_string(),
                    divisor: 1.0,
                },
            ),
        )
        .setting(SettingDefinition::new("restore_switch_state_mode", 5, 1))
        .setting(
            SettingDefinition::new("mode_of_switch_off_function", 6, 1)
                .with_encoder(SettingEncoder::InvertedFlag),
        )
        .setting(SettingDefinition::new("led_indication_mode", 7, 1))
        .setting(
            SettingDefinition::new("enable_auto_off_timer", 8, 1).with_encoder(
                SettingEncoder::GatedInterval {
                    enable: "enable_auto_off_timer".to_string(),
                    period: "auto_off_timer".to_string(),
                    divisor: 1.0,
                },
            ),
        )
        .setting(
            SettingDefinition::new("auto_off_timer", 8, 1).with_encoder(
                SettingEncoder::GatedInterval {
                    enable: "enable_auto_off_timer".to_string(),
                    period: "auto_off_timer".to_string(),
                    divisor: 1.0,
                },
            ),
        )
        .setting(SettingDefinition::new("rf_off_command_mode", 9, 1))
        .build()
}
