//! Configuration-parameter codec.
//!
//! Device settings are written as indexed, sized configuration parameters.
//! Some parameters pack several logical settings into one byte, and some
//! pair an enable flag with a period value at the same index; every encoder
//! therefore works from a snapshot of *all* current settings with the new
//! value substituted, so that re-encoding from either sibling produces the
//! same bytes. Encoding is a pure function of (name, value, snapshot).

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use zwavemap_core::{CapabilityValue, CodecError, Result};

use crate::transcode::encode_int_be;

/// All current settings of one device, by name.
///
/// The codec never reads a partial view: [`SettingsCodec::encode_setting`]
/// substitutes the new value into a copy of this snapshot before any
/// encoder runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    values: HashMap<String, CapabilityValue>,
}

impl SettingsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<CapabilityValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: CapabilityValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&CapabilityValue> {
        self.values.get(name)
    }

    /// Truthiness of a flag-like setting; absent settings read as false.
    pub fn flag(&self, name: &str) -> bool {
        match self.values.get(name) {
            Some(CapabilityValue::Boolean(b)) => *b,
            Some(CapabilityValue::Integer(v)) => *v != 0,
            Some(CapabilityValue::Float(v)) => *v != 0.0,
            _ => false,
        }
    }

    fn numeric(&self, name: &str) -> Result<f64> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| CodecError::UnknownSetting(name.to_string()))?;
        value.as_f64().ok_or(CodecError::InvalidValueType {
            expected: "number",
            actual: value.type_name(),
        })
    }

    /// Build a snapshot from a JSON object of name/value pairs.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut snapshot = Self::new();
        for (name, entry) in obj {
            let value = match entry {
                serde_json::Value::Bool(b) => CapabilityValue::Boolean(*b),
                serde_json::Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        CapabilityValue::Integer(i)
                    } else {
                        CapabilityValue::Float(n.as_f64()?)
                    }
                }
                _ => return None,
            };
            snapshot.insert(name.clone(), value);
        }
        Some(snapshot)
    }
}

/// One bit of a packed parameter byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedBit {
    /// Name of the sibling setting contributing this bit.
    pub setting: String,
    /// Bit mask within the packed byte.
    pub mask: u8,
}

impl PackedBit {
    pub fn new(setting: impl Into<String>, mask: u8) -> Self {
        Self {
            setting: setting.into(),
            mask,
        }
    }
}

/// How to compute the numeric parameter value for one setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingEncoder {
    /// The value itself, rounded to the nearest integer.
    Value,
    /// Boolean flag as 0/1.
    Flag,
    /// Boolean flag as 1/0 (devices where 0 means enabled).
    InvertedFlag,
    /// `round(value / divisor)`: human units to device ticks. A divisor
    /// below 1 scales up (0.5 doubles, 0.01 multiplies by 100).
    ScaledTicks { divisor: f64 },
    /// Values in `threshold..ceiling` saturate to `ceiling`.
    SaturateAbove { threshold: i64, ceiling: i64 },
    /// Fixed base value plus one flag bit.
    FlagBit { base: u8, bit: u8 },
    /// Byte shared by several boolean/enum settings. The whole byte is
    /// recomputed from the snapshot regardless of which sibling changed;
    /// every sibling at the index must declare the same bit table.
    PackedBits { base: u8, bits: Vec<PackedBit> },
    /// Interval gated by a companion enable flag at the same index: the
    /// parameter holds `round(period / divisor)` while enabled and 0 while
    /// disabled, whichever of the two settings triggered the write.
    GatedInterval {
        enable: String,
        period: String,
        divisor: f64,
    },
}

impl SettingEncoder {
    /// Compute the numeric parameter value from the substituted snapshot.
    fn encode(&self, name: &str, view: &SettingsSnapshot) -> Result<i64> {
        match self {
            Self::Value => Ok(round_i64(view.numeric(name)?)),
            Self::Flag => Ok(i64::from(view.flag(name))),
            Self::InvertedFlag => Ok(i64::from(!view.flag(name))),
            Self::ScaledTicks { divisor } => Ok(round_i64(view.numeric(name)? / divisor)),
            Self::SaturateAbove { threshold, ceiling } => {
                let value = round_i64(view.numeric(name)?);
                if value >= *threshold && value < *ceiling {
                    Ok(*ceiling)
                } else {
                    Ok(value)
                }
            }
            Self::FlagBit { base, bit } => {
                let mut byte = *base;
                if view.flag(name) {
                    byte |= bit;
                }
                Ok(i64::from(byte))
            }
            Self::PackedBits { base, bits } => {
                let mut byte = *base;
                for bit in bits {
                    if view.flag(&bit.setting) {
                        byte |= bit.mask;
                    }
                }
                Ok(i64::from(byte))
            }
            Self::GatedInterval {
                enable,
                period,
                divisor,
            } => {
                if !view.flag(enable) {
                    return Ok(0);
                }
                Ok(round_i64(view.numeric(period)? / divisor))
            }
        }
    }
}

fn round_i64(value: f64) -> i64 {
    value.round() as i64
}

/// Declaration of one user-facing setting.
#[derive(Debug, Clone)]
pub struct SettingDefinition {
    pub name: String,
    /// Configuration-parameter index on the device.
    pub index: u8,
    /// Parameter size in bytes (1 or 2).
    pub size: u8,
    pub signed: bool,
    pub encoder: SettingEncoder,
}

impl SettingDefinition {
    pub fn new(name: impl Into<String>, index: u8, size: u8) -> Self {
        Self {
            name: name.into(),
            index,
            size,
            signed: false,
            encoder: SettingEncoder::Value,
        }
    }

    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    pub fn with_encoder(mut self, encoder: SettingEncoder) -> Self {
        self.encoder = encoder;
        self
    }
}

/// A configuration-parameter write, ready for the host's parameter-set
/// mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingWrite {
    pub index: u8,
    pub size: u8,
    /// Parameter value, big-endian, exactly `size` bytes.
    pub data: Vec<u8>,
}

/// Immutable table of setting declarations for one device type.
#[derive(Debug, Clone, Default)]
pub struct SettingsCodec {
    order: Vec<Arc<SettingDefinition>>,
    by_name: HashMap<String, Arc<SettingDefinition>>,
}

impl SettingsCodec {
    pub fn builder() -> SettingsCodecBuilder {
        SettingsCodecBuilder::default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.name.as_str())
    }

    pub fn definition(&self, name: &str) -> Option<&SettingDefinition> {
        self.by_name.get(name).map(|s| s.as_ref())
    }

    /// Encode the parameter write for one changed setting.
    ///
    /// Pure: the same snapshot (with `value` substituted at `name`) always
    /// yields the same bytes, no matter which sibling of a shared index
    /// triggered the write.
    pub fn encode_setting(
        &self,
        name: &str,
        value: &CapabilityValue,
        snapshot: &SettingsSnapshot,
    ) -> Result<SettingWrite> {
        let definition = self
            .by_name
            .get(name)
            .ok_or_else(|| CodecError::UnknownSetting(name.to_string()))?;

        let mut view = snapshot.clone();
        view.insert(name.to_string(), value.clone());

        let raw = definition.encoder.encode(name, &view)?;
        let data = encode_int_be(raw, definition.size, definition.signed)?;
        Ok(SettingWrite {
            index: definition.index,
            size: definition.size,
            data,
        })
    }
}

/// Builder for [`SettingsCodec`].
#[derive(Debug, Default)]
pub struct SettingsCodecBuilder {
    settings: Vec<Arc<SettingDefinition>>,
}

impl SettingsCodecBuilder {
    pub fn setting(mut self, definition: SettingDefinition) -> Self {
        self.settings.push(Arc::new(definition));
        self
    }

    pub fn build(self) -> SettingsCodec {
        let by_name = self
            .settings
            .iter()
            .map(|s| (s.name.clone(), Arc::clone(s)))
            .collect();
        SettingsCodec {
            order: self.settings,
            by_name,
        }
    }
}
