//! Built-in device profiles.
//!
//! One module per product, each exposing a `profile()` constructor that
//! assembles the declarative binding, setting, and event tables for that
//! hardware. Profiles are plain values: construct them once at startup and
//! hand them to a dispatcher.

use std::sync::Arc;

use zwavemap_codec::DeviceProfile;

pub mod inline_switch;
pub mod multi_sensor;
pub mod radiator_thermostat;
pub mod scene_remote;
pub mod switch_meter;

/// All built-in profiles.
pub fn builtin_profiles() -> Vec<Arc<DeviceProfile>> {
    vec![
        Arc::new(radiator_thermostat::profile()),
        Arc::new(switch_meter::profile()),
        Arc::new(multi_sensor::profile()),
        Arc::new(scene_remote::profile()),
        Arc::new(scene_remote::profile_mk2()),
        Arc::new(inline_switch::profile()),
    ]
}

/// Look up a built-in profile by its device type identifier.
pub fn find_profile(device_type: &str) -> Option<Arc<DeviceProfile>> {
    builtin_profiles()
        .into_iter()
        .find(|profile| profile.device_type == device_type)
}
