//! Capability codec: declarative bindings between capabilities and
//! command classes.
//!
//! A [`CapabilityBinding`] declares, for one (capability, command class)
//! pair, how to build the get request, how to decode reports, and how to
//! encode set commands. Decoders and encoders are configuration data, not
//! closures, so a binding table is a plain immutable value that can be
//! inspected, serialized, and shared.
//!
//! Several capabilities may share one command class (the multilevel-sensor
//! multiplexing pattern): each decoder first checks its discriminant fields
//! and returns `None` on mismatch, letting the registry try the next
//! binding. A `None` is part of normal dispatch, never an error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use zwavemap_core::{CapabilityValue, CodecError, FieldMap, Result};

use crate::transcode::{
    decode_fixed_point, decode_int_be, decode_percent_or_sentinel, encode_fixed_point,
    fahrenheit_to_celsius, round_decimals,
};

/// Z-Wave command classes understood by this library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandClass {
    Basic,
    Battery,
    SensorBinary,
    SensorMultilevel,
    SwitchBinary,
    Meter,
    ThermostatSetpoint,
    CentralScene,
    Protection,
    Configuration,
}

impl CommandClass {
    /// Protocol-assigned class identifier.
    pub fn id(self) -> u8 {
        match self {
            Self::Basic => 0x20,
            Self::SwitchBinary => 0x25,
            Self::SensorBinary => 0x30,
            Self::SensorMultilevel => 0x31,
            Self::Meter => 0x32,
            Self::ThermostatSetpoint => 0x43,
            Self::CentralScene => 0x5B,
            Self::Configuration => 0x70,
            Self::Protection => 0x75,
            Self::Battery => 0x80,
        }
    }

    /// Canonical wire name as used by host command-class libraries.
    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "COMMAND_CLASS_BASIC",
            Self::SwitchBinary => "COMMAND_CLASS_SWITCH_BINARY",
            Self::SensorBinary => "COMMAND_CLASS_SENSOR_BINARY",
            Self::SensorMultilevel => "COMMAND_CLASS_SENSOR_MULTILEVEL",
            Self::Meter => "COMMAND_CLASS_METER",
            Self::ThermostatSetpoint => "COMMAND_CLASS_THERMOSTAT_SETPOINT",
            Self::CentralScene => "COMMAND_CLASS_CENTRAL_SCENE",
            Self::Configuration => "COMMAND_CLASS_CONFIGURATION",
            Self::Protection => "COMMAND_CLASS_PROTECTION",
            Self::Battery => "COMMAND_CLASS_BATTERY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "COMMAND_CLASS_BASIC" => Some(Self::Basic),
            "COMMAND_CLASS_SWITCH_BINARY" => Some(Self::SwitchBinary),
            "COMMAND_CLASS_SENSOR_BINARY" => Some(Self::SensorBinary),
            "COMMAND_CLASS_SENSOR_MULTILEVEL" => Some(Self::SensorMultilevel),
            "COMMAND_CLASS_METER" => Some(Self::Meter),
            "COMMAND_CLASS_THERMOSTAT_SETPOINT" => Some(Self::ThermostatSetpoint),
            "COMMAND_CLASS_CENTRAL_SCENE" => Some(Self::CentralScene),
            "COMMAND_CLASS_CONFIGURATION" => Some(Self::Configuration),
            "COMMAND_CLASS_PROTECTION" => Some(Self::Protection),
            "COMMAND_CLASS_BATTERY" => Some(Self::Battery),
            _ => None,
        }
    }
}

impl std::fmt::Display for CommandClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How to decode one report family into a capability value.
///
/// Every variant verifies its discriminant fields before extracting a
/// value and resolves to `None` on mismatch or malformed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReportDecoder {
    /// BATTERY_REPORT. Accepts both the parsed `"Battery Level"` label and
    /// the raw byte; `0xFF` (or the label `"battery low warning"`) maps to
    /// the low-battery sentinel value `1`.
    BatteryLevel,
    /// SENSOR_MULTILEVEL_REPORT filtered on `"Sensor Type"`. Temperature
    /// sensor types reported on scale 1 (Fahrenheit) are converted to
    /// Celsius; non-temperature types only match scale 0.
    MultilevelSensor {
        sensor_type: String,
        /// Round the decoded value to this many decimal places.
        decimals: Option<u8>,
    },
    /// SENSOR_BINARY_REPORT filtered on `"Sensor Type"`.
    BinarySensor { sensor_type: String },
    /// BASIC_SET used as a clear signal: value 0 decodes to `false`,
    /// anything else is a non-match.
    BasicClearOnly,
    /// BASIC_REPORT on/off: `"Current Value"` with `"Value"` fallback.
    BasicOnOff,
    /// SWITCH_BINARY_REPORT: boolean, integer, or `"on/enable"` label.
    BinarySwitch,
    /// METER_REPORT filtered on a scale discriminant field. The field path
    /// varies by firmware (`"Properties2.Scale bits 10"` vs
    /// `"Properties2.Scale"`), so it is part of the configuration.
    Meter { scale_field: String, scale: i64 },
    /// THERMOSTAT_SETPOINT_REPORT: fixed-point value in the raw `"Value"`
    /// buffer, described by the `"Level2"` size/scale/precision triple.
    Setpoint { setpoint_type: String, scale: i64 },
}

impl ReportDecoder {
    /// Decode a report into a capability value.
    ///
    /// `None` means the report does not belong to this binding (wrong
    /// discriminant, missing field, malformed buffer) and carries no other
    /// significance.
    pub fn decode(&self, report: &FieldMap) -> Option<CapabilityValue> {
        match self {
            Self::BatteryLevel => Self::decode_battery(report),
            Self::MultilevelSensor {
                sensor_type,
                decimals,
            } => Self::decode_multilevel(report, sensor_type, *decimals),
            Self::BinarySensor { sensor_type } => Self::decode_binary_sensor(report, sensor_type),
            Self::BasicClearOnly => match report.int_at("Value")? {
                0 => Some(CapabilityValue::Boolean(false)),
                _ => None,
            },
            Self::BasicOnOff => {
                let raw = report
                    .int_at("Current Value")
                    .or_else(|| report.int_at("Value"))?;
                Some(CapabilityValue::Boolean(raw != 0))
            }
            Self::BinarySwitch => Self::decode_binary_switch(report),
            Self::Meter { scale_field, scale } => {
                if report.int_at(scale_field)? != *scale {
                    trace!(field = %scale_field, "meter report on a different scale");
                    return None;
                }
                report
                    .float_at("Meter Value (Parsed)")
                    .map(CapabilityValue::Float)
            }
            Self::Setpoint {
                setpoint_type,
                scale,
            } => Self::decode_setpoint(report, setpoint_type, *scale),
        }
    }

    fn decode_battery(report: &FieldMap) -> Option<CapabilityValue> {
        // Some firmwares deliver a parsed label instead of the raw byte.
        if report.str_at("Battery Level") == Some("battery low warning") {
            return Some(CapabilityValue::Integer(1));
        }
        let raw = report
            .bytes_at("Battery Level (Raw)")
            .and_then(|bytes| bytes.first().copied())
            .or_else(|| {
                report
                    .int_at("Battery Level (Raw)")
                    .and_then(|v| u8::try_from(v).ok())
            })?;
        Some(CapabilityValue::Integer(i64::from(
            decode_percent_or_sentinel(raw),
        )))
    }

    fn decode_multilevel(
        report: &FieldMap,
        sensor_type: &str,
        decimals: Option<u8>,
    ) -> Option<CapabilityValue> {
        if report.str_at("Sensor Type")? != sensor_type {
            trace!(expected = %sensor_type, "multilevel report for a different sensor type");
            return None;
        }
        let raw = report.float_at("Sensor Value (Parsed)")?;
        // Scale 1 is Fahrenheit for temperature sensor types; other types
        // report a different quantity on scale 1 and do not match.
        let value = match report.int_at("Level.Scale") {
            None | Some(0) => raw,
            Some(1) if sensor_type.starts_with("Temperature") => fahrenheit_to_celsius(raw),
            Some(_) => return None,
        };
        let value = match decimals {
            Some(places) => round_decimals(value, places),
            None => value,
        };
        Some(CapabilityValue::Float(value))
    }

    fn decode_binary_sensor(report: &FieldMap, sensor_type: &str) -> Option<CapabilityValue> {
        if report.str_at("Sensor Type")? != sensor_type {
            return None;
        }
        let value = report.str_at("Sensor Value")?;
        Some(CapabilityValue::Boolean(value == "detected an event"))
    }

    fn decode_binary_switch(report: &FieldMap) -> Option<CapabilityValue> {
        match report.get("Value")? {
            zwavemap_core::FieldValue::String(s) => {
                Some(CapabilityValue::Boolean(s == "on/enable"))
            }
            zwavemap_core::FieldValue::Integer(v) => Some(CapabilityValue::Boolean(*v != 0)),
            zwavemap_core::FieldValue::Boolean(b) => Some(CapabilityValue::Boolean(*b)),
            _ => None,
        }
    }

    fn decode_setpoint(
        report: &FieldMap,
        setpoint_type: &str,
        scale: i64,
    ) -> Option<CapabilityValue> {
        // Several firmwares omit the setpoint type in reports; check it
        // only when present.
        if let Some(reported) = report.str_at("Level.Setpoint Type") {
            if reported != setpoint_type {
                return None;
            }
        }
        if report.int_at("Level2.Scale")? != scale {
            return None;
        }
        let precision = u8::try_from(report.int_at("Level2.Precision")?).ok()?;
        if precision > 7 {
            // The wire field is 3 bits; anything larger is garbage.
            return None;
        }
        let size = usize::try_from(report.int_at("Level2.Size")?).ok()?;
        if size == 0 || size > 4 {
            return None;
        }
        let bytes = report.bytes_at("Value")?;
        if bytes.len() < size {
            debug!(
                expected = size,
                actual = bytes.len(),
                "setpoint value buffer shorter than declared size"
            );
            return None;
        }
        let raw = decode_int_be(&bytes[..size], true)?;
        Some(CapabilityValue::Float(decode_fixed_point(raw, precision)))
    }
}

/// A set command encoded from a capability value.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSet {
    /// Wire fields for the set command.
    pub fields: FieldMap,
    /// The value as the device will hold it after the command (e.g. the
    /// setpoint snapped to its step). Callers publish this, not the input.
    pub applied: CapabilityValue,
}

/// How to encode a capability value into a set command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SetEncoder {
    /// SWITCH_BINARY_SET with a boolean `"Switch Value"`.
    BinarySwitch,
    /// SWITCH_BINARY_SET with `"on/enable"` / `"off/disable"` labels.
    BinarySwitchLabeled,
    /// THERMOSTAT_SETPOINT_SET. The emitted size/scale/precision metadata
    /// must match what the report decoder expects so that an encoded value
    /// decodes back to itself within the step granularity.
    Setpoint {
        setpoint_type: String,
        size: u8,
        scale: u8,
        precision: u8,
        /// Snap granularity in engineering units (e.g. 0.5 degrees).
        step: f64,
    },
    /// PROTECTION_SET: local-protection byte plus RF-protection byte.
    Protection,
}

impl SetEncoder {
    pub fn encode(&self, value: &CapabilityValue) -> Result<EncodedSet> {
        match self {
            Self::BinarySwitch => {
                let on = expect_bool(value)?;
                Ok(EncodedSet {
                    fields: FieldMap::new().with("Switch Value", on),
                    applied: CapabilityValue::Boolean(on),
                })
            }
            Self::BinarySwitchLabeled => {
                let on = expect_bool(value)?;
                Ok(EncodedSet {
                    fields: FieldMap::new()
                        .with("Switch Value", if on { "on/enable" } else { "off/disable" }),
                    applied: CapabilityValue::Boolean(on),
                })
            }
            Self::Setpoint {
                setpoint_type,
                size,
                scale,
                precision,
                step,
            } => {
                let requested = expect_number(value)?;
                let snapped = if *step > 0.0 {
                    (requested / step).round() * step
                } else {
                    requested
                };
                let buffer = encode_fixed_point(snapped, *precision, *size)?;
                let fields = FieldMap::new()
                    .with(
                        "Level",
                        FieldMap::new().with("Setpoint Type", setpoint_type.as_str()),
                    )
                    .with(
                        "Level2",
                        FieldMap::new()
                            .with("Size", i64::from(*size))
                            .with("Scale", i64::from(*scale))
                            .with("Precision", i64::from(*precision)),
                    )
                    .with("Value", buffer);
                Ok(EncodedSet {
                    fields,
                    applied: CapabilityValue::Float(snapped),
                })
            }
            Self::Protection => {
                let protected = expect_bool(value)?;
                // Local protection 2 = "no operation possible", 0 = unprotected.
                // RF protection stays unprotected.
                Ok(EncodedSet {
                    fields: FieldMap::new()
                        .with("Level", vec![if protected { 2u8 } else { 0u8 }])
                        .with("Level2", vec![0u8]),
                    applied: CapabilityValue::Boolean(protected),
                })
            }
        }
    }
}

fn expect_bool(value: &CapabilityValue) -> Result<bool> {
    value.as_bool().ok_or(CodecError::InvalidValueType {
        expected: "boolean",
        actual: value.type_name(),
    })
}

fn expect_number(value: &CapabilityValue) -> Result<f64> {
    value.as_f64().ok_or(CodecError::InvalidValueType {
        expected: "number",
        actual: value.type_name(),
    })
}

/// Static get-request parameters for a polled capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetSpec {
    /// Wire command name, e.g. `"SENSOR_MULTILEVEL_GET"`.
    pub command: String,
    /// Declared request fields (may be empty, e.g. `BATTERY_GET`).
    pub fields: FieldMap,
}

/// One (capability, command class) binding.
#[derive(Debug, Clone)]
pub struct CapabilityBinding {
    pub capability: String,
    pub command_class: CommandClass,
    pub get: Option<GetSpec>,
    /// Wire command name of the report this binding decodes.
    pub report_command: Option<String>,
    pub decoder: Option<ReportDecoder>,
    /// Wire command name of the set command this binding encodes.
    pub set_command: Option<String>,
    pub set: Option<SetEncoder>,
    /// Host hint: how often to issue the get request.
    pub poll_interval: Option<Duration>,
    /// Host hint: issue the get request when the device wakes up.
    pub get_on_wake_up: bool,
}

impl CapabilityBinding {
    pub fn new(capability: impl Into<String>, command_class: CommandClass) -> Self {
        Self {
            capability: capability.into(),
            command_class,
            get: None,
            report_command: None,
            decoder: None,
            set_command: None,
            set: None,
            poll_interval: None,
            get_on_wake_up: false,
        }
    }

    pub fn with_get(mut self, command: impl Into<String>, fields: FieldMap) -> Self {
        self.get = Some(GetSpec {
            command: command.into(),
            fields,
        });
        self
    }

    pub fn with_report(mut self, command: impl Into<String>, decoder: ReportDecoder) -> Self {
        self.report_command = Some(command.into());
        self.decoder = Some(decoder);
        self
    }

    pub fn with_set(mut self, command: impl Into<String>, encoder: SetEncoder) -> Self {
        self.set_command = Some(command.into());
        self.set = Some(encoder);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn get_on_wake_up(mut self) -> Self {
        self.get_on_wake_up = true;
        self
    }
}

/// A fully-addressed get request, ready for the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub struct GetRequest {
    pub command_class: CommandClass,
    pub command: String,
    pub fields: FieldMap,
}

/// A fully-addressed set command, ready for the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SetCommand {
    pub command_class: CommandClass,
    pub command: String,
    pub fields: FieldMap,
    /// Value the device will hold after the command (see [`EncodedSet`]).
    pub applied: CapabilityValue,
}

/// Immutable table of capability bindings for one device type.
///
/// Built once at startup and shared by reference; dispatch never mutates
/// it. Bindings are tried in declaration order, so a profile controls
/// decode precedence by ordering.
#[derive(Debug, Clone, Default)]
pub struct CodecRegistry {
    bindings: Vec<Arc<CapabilityBinding>>,
}

impl CodecRegistry {
    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::default()
    }

    pub fn bindings(&self) -> impl Iterator<Item = &CapabilityBinding> {
        self.bindings.iter().map(|b| b.as_ref())
    }

    /// Capability names in declaration order, deduplicated.
    pub fn capabilities(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for binding in &self.bindings {
            if !seen.contains(&binding.capability.as_str()) {
                seen.push(binding.capability.as_str());
            }
        }
        seen
    }

    /// Decode one report against every binding registered for its command
    /// class; the first match wins.
    pub fn decode_report(
        &self,
        command_class: CommandClass,
        command: &str,
        report: &FieldMap,
    ) -> Option<(&str, CapabilityValue)> {
        for binding in &self.bindings {
            if binding.command_class != command_class {
                continue;
            }
            let (Some(report_command), Some(decoder)) = (&binding.report_command, &binding.decoder)
            else {
                continue;
            };
            if report_command != command {
                continue;
            }
            if let Some(value) = decoder.decode(report) {
                return Some((binding.capability.as_str(), value));
            }
        }
        debug!(class = %command_class, command, "report matched no binding");
        None
    }

    /// Build the get request for a capability, if it declares one.
    pub fn build_get(&self, capability: &str) -> Option<GetRequest> {
        self.bindings
            .iter()
            .find(|b| b.capability == capability && b.get.is_some())
            .and_then(|binding| {
                let get = binding.get.as_ref()?;
                Some(GetRequest {
                    command_class: binding.command_class,
                    command: get.command.clone(),
                    fields: get.fields.clone(),
                })
            })
    }

    /// Encode a set command for a capability.
    pub fn build_set(&self, capability: &str, value: &CapabilityValue) -> Result<SetCommand> {
        let mut known = false;
        for binding in &self.bindings {
            if binding.capability != capability {
                continue;
            }
            known = true;
            let (Some(command), Some(encoder)) = (&binding.set_command, &binding.set) else {
                continue;
            };
            let encoded = encoder.encode(value)?;
            return Ok(SetCommand {
                command_class: binding.command_class,
                command: command.clone(),
                fields: encoded.fields,
                applied: encoded.applied,
            });
        }
        if known {
            Err(CodecError::NotSettable(capability.to_string()))
        } else {
            Err(CodecError::UnknownCapability(capability.to_string()))
        }
    }

    pub fn poll_interval(&self, capability: &str) -> Option<Duration> {
        self.bindings
            .iter()
            .find(|b| b.capability == capability)
            .and_then(|b| b.poll_interval)
    }
}

/// Builder for [`CodecRegistry`].
#[derive(Debug, Default)]
pub struct CodecRegistryBuilder {
    bindings: Vec<Arc<CapabilityBinding>>,
}

impl CodecRegistryBuilder {
    pub fn binding(mut self, binding: CapabilityBinding) -> Self {
        self.bindings.push(Arc::new(binding));
        self
    }

    pub fn build(self) -> CodecRegistry {
        CodecRegistry {
            bindings: self.bindings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temperature_binding() -> CapabilityBinding {
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
    }

    fn temperature_report(value: f64) -> FieldMap {
        FieldMap::new()
            .with("Sensor Type", "Temperature (version 1)")
            .with("Sensor Value (Parsed)", value)
            .with("Level", FieldMap::new().with("Scale", 0_i64))
    }

    #[test]
    fn test_temperature_report_rounds_to_one_decimal() {
        let registry = CodecRegistry::builder().binding(temperature_binding()).build();
        let decoded = registry.decode_report(
            CommandClass::SensorMultilevel,
            "SENSOR_MULTILEVEL_REPORT",
            &temperature_report(21.37),
        );
        assert_eq!(
            decoded,
            Some(("measure_temperature", CapabilityValue::Float(21.4)))
        );
    }

    #[test]
    fn test_foreign_sensor_type_is_a_non_match() {
        let registry = CodecRegistry::builder().binding(temperature_binding()).build();
        let report = FieldMap::new()
            .with("Sensor Type", "Luminance")
            .with("Sensor Value (Parsed)", 540.0);
        assert_eq!(
            registry.decode_report(
                CommandClass::SensorMultilevel,
                "SENSOR_MULTILEVEL_REPORT",
                &report
            ),
            None
        );
    }

    #[test]
    fn test_fahrenheit_scale_converts() {
        let decoder = ReportDecoder::MultilevelSensor {
            sensor_type: "Temperature (version 1)".to_string(),
            decimals: Some(1),
        };
        let report = FieldMap::new()
            .with("Sensor Type", "Temperature (version 1)")
            .with("Sensor Value (Parsed)", 68.0)
            .with("Level", FieldMap::new().with("Scale", 1_i64));
        assert_eq!(decoder.decode(&report), Some(CapabilityValue::Float(20.0)));
    }

    #[test]
    fn test_non_temperature_rejects_scale_one() {
        let decoder = ReportDecoder::MultilevelSensor {
            sensor_type: "Power (version 2)".to_string(),
            decimals: None,
        };
        let report = FieldMap::new()
            .with("Sensor Type", "Power (version 2)")
            .with("Sensor Value (Parsed)", 240.0)
            .with("Level", FieldMap::new().with("Scale", 1_i64));
        assert_eq!(decoder.decode(&report), None);
    }

    #[test]
    fn test_battery_sentinel_and_label() {
        let decoder = ReportDecoder::BatteryLevel;

        let raw = FieldMap::new().with("Battery Level (Raw)", vec![0xFF_u8]);
        assert_eq!(decoder.decode(&raw), Some(CapabilityValue::Integer(1)));

        let normal = FieldMap::new().with("Battery Level (Raw)", vec![87_u8]);
        assert_eq!(decoder.decode(&normal), Some(CapabilityValue::Integer(87)));

        let label = FieldMap::new().with("Battery Level", "battery low warning");
        assert_eq!(decoder.decode(&label), Some(CapabilityValue::Integer(1)));

        // Malformed: empty buffer
        let empty = FieldMap::new().with("Battery Level (Raw)", Vec::<u8>::new());
        assert_eq!(decoder.decode(&empty), None);
    }

    #[test]
    fn test_setpoint_report_round_trip() {
        let encoder = SetEncoder::Setpoint {
            setpoint_type: "Heating 1".to_string(),
            size: 2,
            scale: 0,
            precision: 1,
            step: 0.5,
        };
        // 21.3 snaps to 21.5 with a half-degree step
        let encoded = encoder.encode(&CapabilityValue::Float(21.3)).unwrap();
        assert_eq!(encoded.applied, CapabilityValue::Float(21.5));
        assert_eq!(encoded.fields.bytes_at("Value"), Some(&[0x00, 0xD7][..]));

        let decoder = ReportDecoder::Setpoint {
            setpoint_type: "Heating 1".to_string(),
            scale: 0,
        };
        // Feed the encoded command back through the report decoder
        let report = FieldMap::new()
            .with(
                "Level",
                FieldMap::new().with("Setpoint Type", "Heating 1"),
            )
            .with(
                "Level2",
                FieldMap::new()
                    .with("Size", 2_i64)
                    .with("Scale", 0_i64)
                    .with("Precision", 1_i64),
            )
            .with("Value", encoded.fields.bytes_at("Value").unwrap().to_vec());
        assert_eq!(decoder.decode(&report), Some(CapabilityValue::Float(21.5)));
    }

    #[test]
    fn test_setpoint_exact_step_encodes_213() {
        let encoder = SetEncoder::Setpoint {
            setpoint_type: "Heating 1".to_string(),
            size: 2,
            scale: 0,
            precision: 1,
            step: 0.1,
        };
        let encoded = encoder.encode(&CapabilityValue::Float(21.3)).unwrap();
        assert_eq!(encoded.fields.bytes_at("Value"), Some(&[0x00, 0xD5][..]));
        assert_eq!(encoded.fields.int_at("Level2.Precision"), Some(1));
        assert_eq!(encoded.fields.int_at("Level2.Scale"), Some(0));
        assert_eq!(encoded.fields.int_at("Level2.Size"), Some(2));

        // Decoding the emitted payload reproduces the value exactly
        let decoder = ReportDecoder::Setpoint {
            setpoint_type: "Heating 1".to_string(),
            scale: 0,
        };
        let report = FieldMap::new()
            .with(
                "Level2",
                FieldMap::new()
                    .with("Size", 2_i64)
                    .with("Scale", 0_i64)
                    .with("Precision", 1_i64),
            )
            .with("Value", vec![0x00_u8, 0xD5]);
        assert_eq!(decoder.decode(&report), Some(CapabilityValue::Float(21.3)));
    }

    #[test]
    fn test_setpoint_report_malformed_buffer() {
        let decoder = ReportDecoder::Setpoint {
            setpoint_type: "Heating 1".to_string(),
            scale: 0,
        };
        // Declared size 2 but only one byte present
        let report = FieldMap::new()
            .with(
                "Level2",
                FieldMap::new()
                    .with("Size", 2_i64)
                    .with("Scale", 0_i64)
                    .with("Precision", 1_i64),
            )
            .with("Value", vec![0xD5_u8]);
        assert_eq!(decoder.decode(&report), None);

        // Wrong scale
        let report = FieldMap::new()
            .with(
                "Level2",
                FieldMap::new()
                    .with("Size", 1_i64)
                    .with("Scale", 1_i64)
                    .with("Precision", 0_i64),
            )
            .with("Value", vec![70_u8]);
        assert_eq!(decoder.decode(&report), None);
    }

    #[test]
    fn test_binary_switch_variants() {
        let decoder = ReportDecoder::BinarySwitch;
        assert_eq!(
            decoder.decode(&FieldMap::new().with("Value", "on/enable")),
            Some(CapabilityValue::Boolean(true))
        );
        assert_eq!(
            decoder.decode(&FieldMap::new().with("Value", "off/disable")),
            Some(CapabilityValue::Boolean(false))
        );
        assert_eq!(
            decoder.decode(&FieldMap::new().with("Value", 255_i64)),
            Some(CapabilityValue::Boolean(true))
        );
        assert_eq!(decoder.decode(&FieldMap::new()), None);
    }

    #[test]
    fn test_basic_clear_only() {
        let decoder = ReportDecoder::BasicClearOnly;
        assert_eq!(
            decoder.decode(&FieldMap::new().with("Value", 0_i64)),
            Some(CapabilityValue::Boolean(false))
        );
        assert_eq!(decoder.decode(&FieldMap::new().with("Value", 255_i64)), None);
    }

    #[test]
    fn test_meter_scale_discriminant() {
        let decoder = ReportDecoder::Meter {
            scale_field: "Properties2.Scale bits 10".to_string(),
            scale: 2,
        };
        let matching = FieldMap::new()
            .with(
                "Properties2",
                FieldMap::new().with("Scale bits 10", 2_i64),
            )
            .with("Meter Value (Parsed)", 42.5);
        assert_eq!(decoder.decode(&matching), Some(CapabilityValue::Float(42.5)));

        let other_scale = FieldMap::new()
            .with(
                "Properties2",
                FieldMap::new().with("Scale bits 10", 0_i64),
            )
            .with("Meter Value (Parsed)", 1.2);
        assert_eq!(decoder.decode(&other_scale), None);
    }

    #[test]
    fn test_set_encoder_type_errors() {
        let err = SetEncoder::BinarySwitch
            .encode(&CapabilityValue::Float(1.0))
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidValueType { .. }));

        let err = SetEncoder::Setpoint {
            setpoint_type: "Heating 1".to_string(),
            size: 1,
            scale: 0,
            precision: 1,
            step: 0.0,
        }
        .encode(&CapabilityValue::Float(100.0))
        .unwrap_err();
        assert!(matches!(err, CodecError::ValueOutOfRange { .. }));
    }

    #[test]
    fn test_protection_set() {
        let on = SetEncoder::Protection
            .encode(&CapabilityValue::Boolean(true))
            .unwrap();
        assert_eq!(on.fields.bytes_at("Level"), Some(&[2_u8][..]));
        assert_eq!(on.fields.bytes_at("Level2"), Some(&[0_u8][..]));

        let off = SetEncoder::Protection
            .encode(&CapabilityValue::Boolean(false))
            .unwrap();
        assert_eq!(off.fields.bytes_at("Level"), Some(&[0_u8][..]));
    }

    #[test]
    fn test_registry_set_errors() {
        let registry = CodecRegistry::builder().binding(temperature_binding()).build();
        assert!(matches!(
            registry.build_set("measure_temperature", &CapabilityValue::Float(20.0)),
            Err(CodecError::NotSettable(_))
        ));
        assert!(matches!(
            registry.build_set("onoff", &CapabilityValue::Boolean(true)),
            Err(CodecError::UnknownCapability(_))
        ));
    }

    #[test]
    fn test_registry_get_request() {
        let registry = CodecRegistry::builder().binding(temperature_binding()).build();
        let get = registry.build_get("measure_temperature").unwrap();
        assert_eq!(get.command_class, CommandClass::SensorMultilevel);
        assert_eq!(get.command, "SENSOR_MULTILEVEL_GET");
        assert_eq!(get.fields.str_at("Sensor Type"), Some("Temperature (version 1)"));
        assert_eq!(get.fields.int_at("Properties1.Scale"), Some(0));
    }

    #[test]
    fn test_command_class_names_round_trip() {
        for class in [
            CommandClass::Basic,
            CommandClass::Battery,
            CommandClass::SensorBinary,
            CommandClass::SensorMultilevel,
            CommandClass::SwitchBinary,
            CommandClass::Meter,
            CommandClass::ThermostatSetpoint,
            CommandClass::CentralScene,
            CommandClass::Protection,
            CommandClass::Configuration,
        ] {
            assert_eq!(CommandClass::from_name(class.name()), Some(class));
        }
        assert_eq!(CommandClass::from_name("COMMAND_CLASS_UNKNOWN"), None);
    }
}
