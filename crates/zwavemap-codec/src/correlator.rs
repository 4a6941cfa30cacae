//! Event correlation.
//!
//! Two kinds of device events exist. Level-style alarms (battery low) fire
//! once per transition into the alarm value, judged against the device's
//! previous decoded value; recovery is silent. Discrete occurrences
//! (button presses) fire on every matching report through a static scene
//! lookup, with no edge detection.
//!
//! The correlator owns the only mutable state in this library: the
//! last-known value per (device, capability), partitioned per device so
//! reports for different devices can be processed in parallel.

use std::collections::HashMap;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use zwavemap_core::{CapabilityValue, DeviceEvent, DeviceId, FieldMap};

/// Edge-triggered alarm declaration for one capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRule {
    pub capability: String,
    /// Decoded value that signals the alarm condition.
    pub alarm_value: CapabilityValue,
    /// Event fired on the transition into `alarm_value`.
    pub event: String,
}

impl AlarmRule {
    pub fn new(
        capability: impl Into<String>,
        alarm_value: CapabilityValue,
        event: impl Into<String>,
    ) -> Self {
        Self {
            capability: capability.into(),
            alarm_value,
            event: event.into(),
        }
    }
}

/// Fire an event on every decoded report of a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRule {
    pub capability: String,
    pub event: String,
}

impl ReportRule {
    pub fn new(capability: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            event: event.into(),
        }
    }
}

/// Static scene/button-to-event lookup.
///
/// Unknown codes are expected hardware variation and resolve to no event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMap {
    /// Wire command carrying scene notifications.
    pub command: String,
    /// Field holding the scene code (`"Scene Number"` or `"Scene ID"`,
    /// depending on firmware).
    pub field: String,
    events: HashMap<i64, String>,
}

impl SceneMap {
    pub fn new(command: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            field: field.into(),
            events: HashMap::new(),
        }
    }

    pub fn with_scene(mut self, code: i64, event: impl Into<String>) -> Self {
        self.events.insert(code, event.into());
        self
    }

    /// Resolve a scene notification to an event name.
    pub fn resolve(&self, command: &str, report: &FieldMap) -> Option<&str> {
        if command != self.command {
            return None;
        }
        let code = report.int_at(&self.field)?;
        match self.events.get(&code) {
            Some(event) => Some(event.as_str()),
            None => {
                trace!(code, "ignoring unmapped scene code");
                None
            }
        }
    }
}

/// Per-device last-value store with transition-edge event detection.
pub struct EventCorrelator {
    alarms: Vec<AlarmRule>,
    report_events: Vec<ReportRule>,
    last: DashMap<(DeviceId, String), CapabilityValue>,
}

impl EventCorrelator {
    pub fn new(alarms: Vec<AlarmRule>, report_events: Vec<ReportRule>) -> Self {
        Self {
            alarms,
            report_events,
            last: DashMap::new(),
        }
    }

    /// Record a decoded value and decide whether an event fires.
    ///
    /// At most one event per observation: an alarm edge wins over a
    /// per-report rule for the same capability.
    pub fn observe(
        &self,
        device: &DeviceId,
        capability: &str,
        value: &CapabilityValue,
    ) -> Option<DeviceEvent> {
        let previous = self
            .last
            .insert((device.clone(), capability.to_string()), value.clone());

        if let Some(rule) = self.alarms.iter().find(|r| r.capability == capability) {
            let entered_alarm =
                *value == rule.alarm_value && previous.as_ref() != Some(&rule.alarm_value);
            if entered_alarm {
                return Some(DeviceEvent::new(rule.event.clone(), device.clone()));
            }
            return None;
        }

        self.report_events
            .iter()
            .find(|r| r.capability == capability)
            .map(|rule| DeviceEvent::new(rule.event.clone(), device.clone()))
    }

    /// Last decoded value for a capability, if any report has been seen.
    pub fn last_value(&self, device: &DeviceId, capability: &str) -> Option<CapabilityValue> {
        self.last
            .get(&(device.clone(), capability.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Drop all state for a removed device.
    pub fn remove_device(&self, device: &DeviceId) {
        self.last.retain(|(id, _), _| id != device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery_correlator() -> EventCorrelator {
        EventCorrelator::new(
            vec![AlarmRule::new(
                "measure_battery",
                CapabilityValue::Integer(1),
                "battery_alarm",
            )],
            Vec::new(),
        )
    }

    #[test]
    fn test_alarm_fires_once_per_transition() {
        let correlator = battery_correlator();
        let device = DeviceId::new();

        // Decoded battery sequence for raw [50, 0xFF, 0xFF, 20, 0xFF]
        let decoded = [50, 1, 1, 20, 1];
        let mut events = Vec::new();
        for level in decoded {
            if let Some(event) =
                correlator.observe(&device, "measure_battery", &CapabilityValue::Integer(level))
            {
                events.push(event.name);
            }
        }
        // Exactly two transitions into the alarm value
        assert_eq!(events, vec!["battery_alarm", "battery_alarm"]);
    }

    #[test]
    fn test_first_report_in_alarm_state_fires() {
        let correlator = battery_correlator();
        let device = DeviceId::new();
        let event = correlator.observe(&device, "measure_battery", &CapabilityValue::Integer(1));
        assert!(event.is_some());
    }

    #[test]
    fn test_recovery_is_silent() {
        let correlator = battery_correlator();
        let device = DeviceId::new();
        correlator.observe(&device, "measure_battery", &CapabilityValue::Integer(1));
        let recovery =
            correlator.observe(&device, "measure_battery", &CapabilityValue::Integer(80));
        assert!(recovery.is_none());
    }

    #[test]
    fn test_devices_are_independent() {
        let correlator = battery_correlator();
        let first = DeviceId::new();
        let second = DeviceId::new();

        correlator.observe(&first, "measure_battery", &CapabilityValue::Integer(1));
        // The other device has its own edge state
        let event = correlator.observe(&second, "measure_battery", &CapabilityValue::Integer(1));
        assert!(event.is_some());
    }

    #[test]
    fn test_remove_device_resets_edge_state() {
        let correlator = battery_correlator();
        let device = DeviceId::new();

        correlator.observe(&device, "measure_battery", &CapabilityValue::Integer(1));
        correlator.remove_device(&device);
        assert_eq!(correlator.last_value(&device, "measure_battery"), None);

        // Re-included device starts from scratch: the alarm fires again
        let event = correlator.observe(&device, "measure_battery", &CapabilityValue::Integer(1));
        assert!(event.is_some());
    }

    #[test]
    fn test_report_rule_fires_every_time() {
        let correlator = EventCorrelator::new(
            Vec::new(),
            vec![ReportRule::new("measure_luminance_level", "brightness")],
        );
        let device = DeviceId::new();
        for value in [100.0, 100.0, 250.0] {
            let event = correlator.observe(
                &device,
                "measure_luminance_level",
                &CapabilityValue::Float(value),
            );
            assert_eq!(event.map(|e| e.name), Some("brightness".to_string()));
        }
    }

    #[test]
    fn test_scene_map_lookup() {
        let map = SceneMap::new("CENTRAL_SCENE_NOTIFICATION", "Scene Number")
            .with_scene(1, "btn1_single")
            .with_scene(5, "btn1_double");

        let report = FieldMap::new().with("Scene Number", 5_i64);
        assert_eq!(
            map.resolve("CENTRAL_SCENE_NOTIFICATION", &report),
            Some("btn1_double")
        );

        // Unmapped code: no event, no error
        let unmapped = FieldMap::new().with("Scene Number", 9_i64);
        assert_eq!(map.resolve("CENTRAL_SCENE_NOTIFICATION", &unmapped), None);

        // Different command
        assert_eq!(map.resolve("CENTRAL_SCENE_CONFIGURATION", &report), None);

        // Missing field
        assert_eq!(map.resolve("CENTRAL_SCENE_NOTIFICATION", &FieldMap::new()), None);
    }
}
