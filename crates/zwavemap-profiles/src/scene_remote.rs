//! Four-button wall remotes.
//!
//! Two firmware generations of the same hardware: both notify button
//! presses through the central-scene command class, but the first revision
//! puts the code in `"Scene Number"` and the second in `"Scene ID"`. Codes
//! 1-4 are single presses, 5-8 the corresponding double presses; anything
//! else is firmware variation and ignored.

use zwavemap_codec::{
    AlarmRule, CapabilityBinding, CommandClass, DeviceProfile, ProfileBuilder, ReportDecoder,
    SceneMap, SettingDefinition, SettingEncoder,
};
use zwavemap_core::{CapabilityValue, FieldMap};

pub const DEVICE_TYPE: &str = "scene_remote";
pub const DEVICE_TYPE_MK2: &str = "scene_remote_mk2";

fn button_scenes(field: &str) -> SceneMap {
    SceneMap::new("CENTRAL_SCENE_NOTIFICATION", field)
        .with_scene(1, "btn1_single")
        .with_scene(2, "btn2_single")
        .with_scene(3, "btn3_single")
        .with_scene(4, "btn4_single")
        .with_scene(5, "btn1_double")
        .with_scene(6, "btn2_double")
        .with_scene(7, "btn3_double")
        .with_scene(8, "btn4_double")
}

fn remote_settings(builder: ProfileBuilder) -> ProfileBuilder {
    builder
        .setting(SettingDefinition::new("button_1_and_3_pair_mode", 1, 1))
        .setting(SettingDefinition::new("button_2_and_4_pair_mode", 2, 1))
        .setting(SettingDefinition::new("command_to_control_group_a", 11, 1))
        .setting(SettingDefinition::new("command_to_control_group_b", 12, 1))
        .setting(SettingDefinition::new("command_to_control_group_c", 13, 1))
        .setting(SettingDefinition::new("command_to_control_group_d", 14, 1))
        .setting(SettingDefinition::new("send_switch_all_commands", 21, 1))
        .setting(
            SettingDefinition::new("invert_buttons", 22, 1).with_encoder(SettingEncoder::Flag),
        )
        .setting(SettingDefinition::new("block_wakeup", 25, 1))
        .setting(SettingDefinition::new(
            "send_battery_report_on_wake_up",
            30,
            1,
        ))
}

/// First revision: battery is report-only, scene code in `"Scene Number"`.
pub fn profile() -> DeviceProfile {
    remote_settings(
        DeviceProfile::builder(DEVICE_TYPE, "4-Button Scene Remote")
            .binding(
                CapabilityBinding::new("measure_battery", CommandClass::Battery)
                    .with_report("BATTERY_REPORT", ReportDecoder::BatteryLevel),
            )
            .scene_map(button_scenes("Scene Number")),
    )
    .build()
}

/// Second revision: battery is pollable and raises the low-battery alarm,
/// scene code in `"Scene ID"`.
pub fn profile_mk2() -> DeviceProfile {
    remote_settings(
        DeviceProfile::builder(DEVICE_TYPE_MK2, "4-Button Scene Remote Mk2")
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
            .scene_map(button_scenes("Scene ID")),
    )
    .build()
}
