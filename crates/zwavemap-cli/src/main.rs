//! Command-line inspection tool for zwavemap device profiles.
//!
//! Feeds hand-written report field bags through a profile's dispatch
//! pipeline and prints decoded values, fired events, and encoded commands.
//! Useful when bringing up a new device or checking a firmware quirk.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};

use zwavemap_codec::{CommandClass, ReportDispatcher, SettingsSnapshot};
use zwavemap_core::{CapabilityValue, DeviceId, FieldMap, RecordingSink};
use zwavemap_profiles::{builtin_profiles, find_profile};

/// Inspect and exercise built-in Z-Wave device profiles.
#[derive(Parser, Debug)]
#[command(name = "zwavemap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List built-in device profiles.
    Profiles,
    /// Show capabilities and settings of a profile.
    Capabilities {
        /// Device type identifier, e.g. `multi_sensor`.
        device_type: String,
    },
    /// Decode a report through a profile's dispatch pipeline.
    Decode {
        /// Device type identifier.
        device_type: String,
        /// Command class wire name, e.g. `COMMAND_CLASS_BATTERY`.
        class: String,
        /// Report command name, e.g. `BATTERY_REPORT`.
        command: String,
        /// Report fields as JSON (byte buffers as integer arrays).
        report: String,
    },
    /// Print the get request declared for a capability.
    Request {
        device_type: String,
        capability: String,
    },
    /// Encode a capability value into a set command.
    EncodeSet {
        device_type: String,
        capability: String,
        /// New value as JSON (`true`, `21.5`, ...).
        value: String,
    },
    /// Encode a setting change into a configuration-parameter write.
    EncodeSetting {
        device_type: String,
        setting: String,
        /// New value as JSON.
        value: String,
        /// All current settings as a JSON object.
        #[arg(long, default_value = "{}")]
        settings: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Profiles => {
            for profile in builtin_profiles() {
                println!("{:<20} {}", profile.device_type, profile.name);
            }
        }
        Command::Capabilities { device_type } => {
            let profile = lookup(&device_type)?;
            for capability in profile.registry.capabilities() {
                let get = profile
                    .registry
                    .build_get(capability)
                    .map(|g| format!(" get={}", g.command))
                    .unwrap_or_default();
                println!("{}{}", capability, get);
            }
            let settings: Vec<_> = profile.settings.names().collect();
            if !settings.is_empty() {
                println!("settings: {}", settings.join(", "));
            }
        }
        Command::Decode {
            device_type,
            class,
            command,
            report,
        } => {
            let profile = lookup(&device_type)?;
            let class = CommandClass::from_name(&class)
                .ok_or_else(|| anyhow!("unknown command class: {class}"))?;
            let json: serde_json::Value =
                serde_json::from_str(&report).context("report is not valid JSON")?;
            let report =
                FieldMap::from_json(&json).ok_or_else(|| anyhow!("report must be a JSON object"))?;

            let sink = RecordingSink::new();
            let dispatcher = ReportDispatcher::new(profile, sink.clone());
            let device = DeviceId::new();
            match dispatcher.on_report(&device, class, &command, &report) {
                Some((capability, value)) => println!("{} = {}", capability, value),
                None => println!("no binding matched"),
            }
            for event in sink.events() {
                println!("event: {}", event.name);
            }
        }
        Command::Request {
            device_type,
            capability,
        } => {
            let profile = lookup(&device_type)?;
            let Some(request) = profile.registry.build_get(&capability) else {
                bail!("capability {capability} declares no get request");
            };
            println!("{} {}", request.command_class, request.command);
            println!("{}", request.fields.to_json());
        }
        Command::EncodeSet {
            device_type,
            capability,
            value,
        } => {
            let profile = lookup(&device_type)?;
            let value = parse_value(&value)?;
            let command = profile.registry.build_set(&capability, &value)?;
            println!("{} {}", command.command_class, command.command);
            println!("{}", command.fields.to_json());
            println!("applied: {}", command.applied);
        }
        Command::EncodeSetting {
            device_type,
            setting,
            value,
            settings,
        } => {
            let profile = lookup(&device_type)?;
            let value = parse_value(&value)?;
            let json: serde_json::Value =
                serde_json::from_str(&settings).context("settings are not valid JSON")?;
            let snapshot = SettingsSnapshot::from_json(&json)
                .ok_or_else(|| anyhow!("settings must be a JSON object of scalars"))?;
            let write = profile.settings.encode_setting(&setting, &value, &snapshot)?;
            println!("parameter {} = 0x{}", write.index, hex::encode(&write.data));
        }
    }
    Ok(())
}

fn lookup(device_type: &str) -> Result<std::sync::Arc<zwavemap_codec::DeviceProfile>> {
    find_profile(device_type).ok_or_else(|| {
        anyhow!(
            "unknown device type: {device_type} (try one of: {})",
            builtin_profiles()
                .iter()
                .map(|p| p.device_type.clone())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

fn parse_value(raw: &str) -> Result<CapabilityValue> {
    let json: serde_json::Value = serde_json::from_str(raw).context("value is not valid JSON")?;
    match json {
        serde_json::Value::Bool(b) => Ok(CapabilityValue::Boolean(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(CapabilityValue::Integer(i))
            } else {
                Ok(CapabilityValue::Float(
                    n.as_f64().ok_or_else(|| anyhow!("unrepresentable number"))?,
                ))
            }
        }
        other => bail!("expected a boolean or number, got {other}"),
    }
}
