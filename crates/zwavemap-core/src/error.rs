//! Error types shared across the codec crates.
//!
//! The decode side of the library is deliberately error-free: a report that
//! does not match a binding, or a malformed field bag, resolves to `None` so
//! that firmware variation never crashes the dispatch loop. `CodecError`
//! covers the encode side only, where the caller hands us a value.

/// Errors raised when encoding capability values or settings.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Value cannot be represented in the declared byte width.
    #[error("value {value} out of range for {width}-byte field")]
    ValueOutOfRange { value: i64, width: u8 },

    /// A value of the wrong type was supplied for a capability or setting.
    #[error("invalid value type: expected {expected}, got {actual}")]
    InvalidValueType {
        expected: &'static str,
        actual: &'static str,
    },

    /// No binding is registered under this capability name.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// No setting is declared under this name.
    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    /// The capability has no set command (report-only or get-only binding).
    #[error("capability is not settable: {0}")]
    NotSettable(String),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
