//! Wire-level field bags.
//!
//! Command-class reports and commands travel as named field bags whose
//! layout varies by command class (`"Sensor Type"`, `"Level2.Scale"`,
//! `"Battery Level (Raw)"`, ...). A [`FieldMap`] is the read-only view a
//! codec gets for the duration of one decode call, and the structure a
//! codec builds for one outbound command. Field names are the wire schema
//! contract with the host command-class library and are preserved verbatim.
//!
//! All getters fail closed: a missing field, a wrong type, or a dangling
//! path segment yields `None`, never a panic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// Binary fields serialize as base64 strings
mod bytes_serde {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

/// One field of a command-class message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    /// Raw byte buffer (e.g. the `"Value"` field of a setpoint report).
    #[serde(with = "bytes_serde")]
    Bytes(Vec<u8>),
    /// Nested structure (e.g. `"Level2"`, `"Properties1"`).
    Map(FieldMap),
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<FieldMap> for FieldValue {
    fn from(v: FieldMap) -> Self {
        Self::Map(v)
    }
}

/// Named field bag for one report or command.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldMap {
    fields: HashMap<String, FieldValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert for declarative construction.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Resolve a dotted path (`"Level2.Scale"`) through nested maps.
    ///
    /// Field names themselves never contain dots, so a dot always means
    /// one level of nesting.
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        let mut current = self;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let value = current.fields.get(segment)?;
            if segments.peek().is_none() {
                return Some(value);
            }
            match value {
                FieldValue::Map(map) => current = map,
                _ => return None,
            }
        }
        None
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn int_at(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of a field; integers coerce to float.
    pub fn float_at(&self, path: &str) -> Option<f64> {
        match self.get(path)? {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn str_at(&self, path: &str) -> Option<&str> {
        match self.get(path)? {
            FieldValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn bool_at(&self, path: &str) -> Option<bool> {
        match self.get(path)? {
            FieldValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn bytes_at(&self, path: &str) -> Option<&[u8]> {
        match self.get(path)? {
            FieldValue::Bytes(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn map_at(&self, path: &str) -> Option<&FieldMap> {
        match self.get(path)? {
            FieldValue::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a field bag from a JSON object.
    ///
    /// Entries that have no field representation are dropped. A JSON array
    /// is accepted only when every element is an integer in `0..=255` and
    /// becomes a byte buffer; anything else in an array position is not a
    /// wire field.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut map = Self::new();
        for (key, val) in obj {
            if let Some(field) = FieldValue::from_json(val) {
                map.fields.insert(key.clone(), field);
            } else {
                tracing::debug!(field = %key, "dropping field with no wire representation");
            }
        }
        Some(map)
    }

    /// JSON rendering of this field bag (byte buffers become integer arrays).
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        for (key, value) in &self.fields {
            obj.insert(key.clone(), value.to_json());
        }
        serde_json::Value::Object(obj)
    }
}

impl FieldValue {
    fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Integer(i))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            serde_json::Value::Array(items) => {
                let bytes: Option<Vec<u8>> = items
                    .iter()
                    .map(|item| item.as_u64().and_then(|v| u8::try_from(v).ok()))
                    .collect();
                bytes.map(Self::Bytes)
            }
            serde_json::Value::Object(_) => FieldMap::from_json(value).map(Self::Map),
            serde_json::Value::Null => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Integer(v) => serde_json::Value::from(*v),
            Self::Float(v) => serde_json::Value::from(*v),
            Self::String(v) => serde_json::Value::from(v.clone()),
            Self::Boolean(v) => serde_json::Value::from(*v),
            Self::Bytes(v) => {
                serde_json::Value::Array(v.iter().map(|b| serde_json::Value::from(*b)).collect())
            }
            Self::Map(v) => v.to_json(),
        }
    }
}
