//! Bidirectional value codecs between Z-Wave command-class payloads and
//! typed capability values.
//!
//! The pieces, leaf-first:
//! - [`transcode`]: scalar fixed-point/integer helpers
//! - [`capability`]: declarative (capability, command class) bindings and
//!   the per-device-type registry
//! - [`settings`]: configuration-parameter encoding, including packed and
//!   gated multi-setting parameters
//! - [`correlator`]: transition-edge alarms and scene/button lookup
//! - [`dispatch`]: the host-facing pipeline tying it all together
//!
//! All codec operations are synchronous and reentrant; the only mutable
//! state is the correlator's per-device last-value store.

pub mod capability;
pub mod correlator;
pub mod dispatch;
pub mod settings;
pub mod transcode;

pub use capability::{
    CapabilityBinding, CodecRegistry, CodecRegistryBuilder, CommandClass, EncodedSet, GetRequest,
    GetSpec, ReportDecoder, SetCommand, SetEncoder,
};
pub use correlator::{AlarmRule, EventCorrelator, ReportRule, SceneMap};
pub use dispatch::{DeviceProfile, ProfileBuilder, ReportDispatcher};
pub use settings::{
    PackedBit, SettingDefinition, SettingEncoder, SettingWrite, SettingsCodec,
    SettingsCodecBuilder, SettingsSnapshot,
};
