//! Report dispatch: the boundary with the host transport layer.
//!
//! A [`DeviceProfile`] bundles everything declared for one product: the
//! capability binding table, the settings table, and the event rules. A
//! [`ReportDispatcher`] pairs a profile with an event sink and per-device
//! correlator state, keeping the codecs themselves pure: decode returns a
//! value, the dispatcher publishes.

use std::sync::Arc;

use tracing::debug;

use zwavemap_core::{CapabilityValue, DeviceEvent, DeviceId, EventSink, FieldMap, Result};

use crate::capability::{CodecRegistry, CommandClass, GetRequest, SetCommand};
use crate::correlator::{AlarmRule, EventCorrelator, ReportRule, SceneMap};
use crate::settings::{SettingsCodec, SettingsSnapshot, SettingWrite};

/// Everything the codec layer knows about one device type.
///
/// Immutable after construction; built once at startup and shared by
/// reference with every dispatcher serving devices of this type.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    /// Stable identifier, e.g. `"radiator_thermostat"`.
    pub device_type: String,
    /// Human-readable product name.
    pub name: String,
    pub registry: CodecRegistry,
    pub settings: SettingsCodec,
    pub alarms: Vec<AlarmRule>,
    pub report_events: Vec<ReportRule>,
    pub scenes: Option<SceneMap>,
}

impl DeviceProfile {
    pub fn builder(device_type: impl Into<String>, name: impl Into<String>) -> ProfileBuilder {
        ProfileBuilder {
            device_type: device_type.into(),
            name: name.into(),
            registry: CodecRegistry::builder(),
            settings: SettingsCodec::builder(),
            alarms: Vec::new(),
            report_events: Vec::new(),
            scenes: None,
        }
    }
}

/// Builder for [`DeviceProfile`].
pub struct ProfileBuilder {
    device_type: String,
    name: String,
    registry: crate::capability::CodecRegistryBuilder,
    settings: crate::settings::SettingsCodecBuilder,
    alarms: Vec<AlarmRule>,
    report_events: Vec<ReportRule>,
    scenes: Option<SceneMap>,
}

impl ProfileBuilder {
    pub fn binding(mut self, binding: crate::capability::CapabilityBinding) -> Self {
        self.registry = self.registry.binding(binding);
        self
    }

    pub fn setting(mut self, definition: crate::settings::SettingDefinition) -> Self {
        self.settings = self.settings.setting(definition);
        self
    }

    pub fn alarm(mut self, rule: AlarmRule) -> Self {
        self.alarms.push(rule);
        self
    }

    pub fn report_event(mut self, rule: ReportRule) -> Self {
        self.report_events.push(rule);
        self
    }

    pub fn scene_map(mut self, map: SceneMap) -> Self {
        self.scenes = Some(map);
        self
    }

    pub fn build(self) -> DeviceProfile {
        DeviceProfile {
            device_type: self.device_type,
            name: self.name,
            registry: self.registry.build(),
            settings: self.settings.build(),
            alarms: self.alarms,
            report_events: self.report_events,
            scenes: self.scenes,
        }
    }
}

/// Host-facing dispatch for one device type.
///
/// One report is processed fully before the next for a given device; the
/// host may interleave devices freely, since correlator state is
/// partitioned per device identity.
pub struct ReportDispatcher<S: EventSink> {
    profile: Arc<DeviceProfile>,
    correlator: EventCorrelator,
    sink: S,
}

impl<S: EventSink> ReportDispatcher<S> {
    pub fn new(profile: Arc<DeviceProfile>, sink: S) -> Self {
        let correlator =
            EventCorrelator::new(profile.alarms.clone(), profile.report_events.clone());
        Self {
            profile,
            correlator,
            sink,
        }
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Process one inbound report.
    ///
    /// Returns the decoded capability value, if any binding matched, and
    /// emits at most one device event through the sink. Malformed or
    /// unrecognized reports resolve to `None`; nothing here errors or
    /// panics on inbound traffic.
    pub fn on_report(
        &self,
        device: &DeviceId,
        command_class: CommandClass,
        command: &str,
        report: &FieldMap,
    ) -> Option<(String, CapabilityValue)> {
        // Scene notifications are discrete occurrences, not state: they
        // bypass the value store entirely.
        if command_class == CommandClass::CentralScene {
            if let Some(scenes) = &self.profile.scenes {
                if let Some(event) = scenes.resolve(command, report) {
                    self.sink
                        .emit(DeviceEvent::new(event.to_string(), device.clone()));
                }
            } else {
                debug!(device_type = %self.profile.device_type, "scene notification without a scene map");
            }
            return None;
        }

        let (capability, value) =
            self.profile
                .registry
                .decode_report(command_class, command, report)?;
        if let Some(event) = self.correlator.observe(device, capability, &value) {
            self.sink.emit(event);
        }
        Some((capability.to_string(), value))
    }

    /// Build the get request for a capability, if it declares one.
    pub fn build_get(&self, capability: &str) -> Option<GetRequest> {
        self.profile.registry.build_get(capability)
    }

    /// Encode a set command for a capability value.
    pub fn build_set(&self, capability: &str, value: &CapabilityValue) -> Result<SetCommand> {
        self.profile.registry.build_set(capability, value)
    }

    /// Encode a configuration-parameter write for a changed setting.
    pub fn encode_setting(
        &self,
        name: &str,
        value: &CapabilityValue,
        snapshot: &SettingsSnapshot,
    ) -> Result<SettingWrite> {
        self.profile.settings.encode_setting(name, value, snapshot)
    }

    /// Last decoded value for a device capability.
    pub fn last_value(&self, device: &DeviceId, capability: &str) -> Option<CapabilityValue> {
        self.correlator.last_value(device, capability)
    }

    /// Drop correlator state for a removed device.
    pub fn remove_device(&self, device: &DeviceId) {
        self.correlator.remove_device(device);
    }
}
