//! Stub source configuration and normalization
//!
//! Raw node params arrive as a string-keyed JSON map, frequently carrying
//! stringly-typed values sourced from environment variables. [`normalize`]
//! is the single coercion boundary: past it, the rest of the crate only
//! ever sees the typed [`StubSourceConfig`].
//!
//! Precedence over raw entries (defaults < environment < explicit) is the
//! caller's job; [`env_overrides`] provides the environment layer as a raw
//! map ready to merge.

use framepipe_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Environment variables recognized by [`env_overrides`], paired with the
/// config key each one feeds
pub const ENV_VARS: [(&str, &str); 6] = [
    ("STUB_SOURCE_DEBUG", "debug"),
    ("STUB_SOURCE_FORWARD_UPSTREAM_DATA", "forward_upstream_data"),
    ("STUB_SOURCE_OUTPUT_MODE", "output_mode"),
    ("STUB_SOURCE_OUTPUT_JSON_PATH", "output_json_path"),
    (
        "STUB_SOURCE_INPUT_JSON_EVENTS_FILE_PATH",
        "input_json_events_file_path",
    ),
    (
        "STUB_SOURCE_INPUT_JSON_TEMPLATE_FILE_PATH",
        "input_json_template_file_path",
    ),
];

/// Event emission mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Replay the recorded events file in order, once
    Echo,
    /// Synthesize schema-conforming events indefinitely
    Random,
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Echo
    }
}

impl FromStr for OutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "echo" => Ok(OutputMode::Echo),
            "random" => Ok(OutputMode::Random),
            _ => Err(Error::Validation(format!(
                "Invalid mode '{}', expected one of: echo, random",
                s
            ))),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Echo => write!(f, "echo"),
            OutputMode::Random => write!(f, "random"),
        }
    }
}

/// Validated stub source configuration
///
/// Immutable once built. Construct through [`normalize`] when values come
/// from a raw string map, or deserialize directly from trusted JSON params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubSourceConfig {
    /// Verbose per-event logging (default: false)
    #[serde(default)]
    pub debug: bool,

    /// Forward non-image upstream frames downstream (default: true)
    #[serde(default = "default_forward_upstream_data")]
    pub forward_upstream_data: bool,

    /// Event emission mode (default: echo)
    #[serde(default)]
    pub output_mode: OutputMode,

    /// JSONL output destination (default: ./output/output.json)
    #[serde(default = "default_output_json_path")]
    pub output_json_path: String,

    /// Events file replayed in echo mode (default: ./input/events.json)
    #[serde(default = "default_input_json_events_file_path")]
    pub input_json_events_file_path: String,

    /// JSON Schema template used in random mode
    /// (default: ./input/events_template.json)
    #[serde(default = "default_input_json_template_file_path")]
    pub input_json_template_file_path: String,
}

fn default_forward_upstream_data() -> bool {
    true
}
fn default_output_json_path() -> String {
    "./output/output.json".to_string()
}
fn default_input_json_events_file_path() -> String {
    "./input/events.json".to_string()
}
fn default_input_json_template_file_path() -> String {
    "./input/events_template.json".to_string()
}

impl Default for StubSourceConfig {
    fn default() -> Self {
        Self {
            debug: false,
            forward_upstream_data: default_forward_upstream_data(),
            output_mode: OutputMode::default(),
            output_json_path: default_output_json_path(),
            input_json_events_file_path: default_input_json_events_file_path(),
            input_json_template_file_path: default_input_json_template_file_path(),
        }
    }
}

/// Normalize a raw params map into a typed configuration
///
/// Absent keys fall back to defaults; unrecognized keys (runtime-injected
/// ids and the like) are ignored. Values are type-checked and coerced
/// only; referenced paths are not touched until setup.
pub fn normalize(raw: &Map<String, Value>) -> Result<StubSourceConfig> {
    let mut config = StubSourceConfig::default();

    if let Some(value) = raw.get("output_mode") {
        config.output_mode = parse_mode(value)?;
    }
    if let Some(value) = raw.get("debug") {
        config.debug = coerce_bool("debug", value)?;
    }
    if let Some(value) = raw.get("forward_upstream_data") {
        config.forward_upstream_data = coerce_bool("forward_upstream_data", value)?;
    }
    if let Some(value) = raw.get("input_json_events_file_path") {
        config.input_json_events_file_path =
            require_path_string("Invalid input JSON events path", value)?;
    }
    if let Some(value) = raw.get("input_json_template_file_path") {
        config.input_json_template_file_path =
            require_path_string("Invalid input JSON template path", value)?;
    }
    if let Some(value) = raw.get("output_json_path") {
        config.output_json_path = require_path_string("Invalid output json path", value)?;
    }

    Ok(config)
}

/// Normalize a raw params value (object or null) into a typed configuration
pub fn normalize_value(params: &Value) -> Result<StubSourceConfig> {
    match params {
        Value::Object(map) => normalize(map),
        Value::Null => Ok(StubSourceConfig::default()),
        other => Err(Error::Validation(format!(
            "Invalid params: expected an object, got {}",
            value_kind(other)
        ))),
    }
}

/// Read recognized environment variables into a raw override map
///
/// Values come back as raw strings under the canonical config keys, ready
/// to merge beneath explicit overrides and feed through [`normalize`].
pub fn env_overrides() -> Map<String, Value> {
    let mut raw = Map::new();
    for (var, key) in ENV_VARS {
        if let Ok(value) = std::env::var(var) {
            raw.insert(key.to_string(), Value::String(value));
        }
    }
    raw
}

fn parse_mode(value: &Value) -> Result<OutputMode> {
    match value {
        Value::String(s) => s.parse(),
        other => Err(Error::Validation(format!(
            "Invalid mode '{}', expected one of: echo, random",
            other
        ))),
    }
}

fn coerce_bool(label: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(invalid_bool(label, value)),
        },
        _ => Err(invalid_bool(label, value)),
    }
}

fn invalid_bool(label: &str, value: &Value) -> Error {
    Error::Validation(format!(
        "Invalid {} value '{}', expected a boolean or one of: true, 1, yes, false, 0, no",
        label, value
    ))
}

fn require_path_string(label: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::Validation(format!(
            "{}: expected a string, got {}",
            label,
            value_kind(other)
        ))),
    }
}

/// Human-readable name for a JSON value's type
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_default() {
        let config = StubSourceConfig::default();
        assert!(!config.debug);
        assert!(config.forward_upstream_data);
        assert_eq!(config.output_mode, OutputMode::Echo);
        assert_eq!(config.output_json_path, "./output/output.json");
    }

    #[test]
    fn test_config_from_json() {
        let json = serde_json::json!({
            "output_mode": "random",
            "forward_upstream_data": false,
        });

        let config: StubSourceConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.output_mode, OutputMode::Random);
        assert!(!config.forward_upstream_data);
        // Defaults for unspecified fields
        assert_eq!(config.input_json_events_file_path, "./input/events.json");
    }

    #[test]
    fn test_mode_display_round_trip() {
        for mode in [OutputMode::Echo, OutputMode::Random] {
            let parsed: OutputMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn test_normalize_value_shapes() {
        assert!(normalize_value(&Value::Null).is_ok());
        assert!(normalize_value(&json!({"output_mode": "echo"})).is_ok());

        let err = normalize_value(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("expected an object"));
    }
}
