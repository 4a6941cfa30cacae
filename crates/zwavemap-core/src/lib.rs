//! Core types for the zwavemap capability-codec library.
//!
//! This crate defines the foundational abstractions shared by the codec and
//! profile crates: typed capability values, wire field bags, device
//! identity, the device-event boundary, and the error taxonomy.

pub mod device;
pub mod error;
pub mod event;
pub mod fields;
pub mod value;

pub use device::DeviceId;
pub use error::{CodecError, Result};
pub use event::{
    DEFAULT_CHANNEL_CAPACITY, DeviceEvent, EventBus, EventBusReceiver, EventMetadata, EventSink,
    NoOpSink, RecordingSink,
};
pub use fields::{FieldMap, FieldValue};
pub use value::CapabilityValue;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
