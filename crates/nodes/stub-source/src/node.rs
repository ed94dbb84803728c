//! Configurable stub data source
//!
//! Replays recorded events from a JSON file (ECHO mode) or synthesizes
//! random events from a JSON Schema template (RANDOM mode). Every emitted
//! event is appended to a JSONL output file; non-image upstream frames are
//! forwarded downstream when `forward_upstream_data` is set.
//!
//! Typical pipeline parameters:
//!
//! ```json
//! {
//!     "output_mode": "random",
//!     "input_json_template_file_path": "./input/events_template.json",
//!     "output_json_path": "./output/output.json"
//! }
//! ```

use crate::config::{self, value_kind, OutputMode, StubSourceConfig};
use crate::generator::SchemaGenerator;
use crate::sink::JsonlSink;
use async_trait::async_trait;
use framepipe_core::{Error, FrameBatch, NodeContext, NodeFactory, Result, SourceNode};
use jsonschema::Validator;
use serde_json::Value;
use std::fs;
use tracing::{debug, info, trace, warn};

/// Replay position within the recorded event sequence, observable through
/// [`StubSourceNode::current_event_index`] and
/// [`StubSourceNode::all_events_processed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EchoProgress {
    /// The next call emits the event at `index`
    Pending { index: usize },
    /// Every recorded event has been emitted
    Exhausted,
}

/// Mode-specific state, built during setup
enum SourceState {
    Echo {
        events: Vec<Value>,
        progress: EchoProgress,
    },
    Random {
        generator: SchemaGenerator,
        validator: Validator,
    },
}

/// Stub source node
///
/// Lifecycle: construct, [`setup`](SourceNode::setup), any number of
/// [`process`](SourceNode::process) calls, [`shutdown`](SourceNode::shutdown).
/// Calling setup again reloads the input and resets the replay cursor.
pub struct StubSourceNode {
    config: StubSourceConfig,
    state: Option<SourceState>,
    sink: Option<JsonlSink>,
}

impl StubSourceNode {
    /// Create a node with default configuration
    pub fn new() -> Self {
        Self::with_config(StubSourceConfig::default())
    }

    /// Create a node with the given configuration
    pub fn with_config(config: StubSourceConfig) -> Self {
        Self {
            config,
            state: None,
            sink: None,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &StubSourceConfig {
        &self.config
    }

    /// Whether setup has completed and the node can emit
    pub fn is_ready(&self) -> bool {
        self.state.is_some() && self.sink.is_some()
    }

    /// Whether the recorded sequence is drained
    ///
    /// Always `false` in RANDOM mode and before setup.
    pub fn all_events_processed(&self) -> bool {
        matches!(
            self.state,
            Some(SourceState::Echo {
                progress: EchoProgress::Exhausted,
                ..
            })
        )
    }

    /// Position of the next recorded event, if any remain
    pub fn current_event_index(&self) -> Option<usize> {
        match self.state {
            Some(SourceState::Echo {
                progress: EchoProgress::Pending { index },
                ..
            }) => Some(index),
            _ => None,
        }
    }

    fn load_events(path: &str) -> Result<Vec<Value>> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Setup(format!("Cannot read events file '{}': {}", path, e)))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| {
            Error::Setup(format!("Events file '{}' is not valid JSON: {}", path, e))
        })?;
        match value {
            Value::Array(events) => Ok(events),
            other => Err(Error::Setup(format!(
                "Events file '{}' must contain a JSON array, got {}",
                path,
                value_kind(&other)
            ))),
        }
    }

    fn load_template(path: &str) -> Result<(Value, Validator)> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Setup(format!("Cannot read template file '{}': {}", path, e)))?;
        let schema: Value = serde_json::from_str(&text).map_err(|e| {
            Error::Setup(format!("Template file '{}' is not valid JSON: {}", path, e))
        })?;
        if !schema.is_object() {
            return Err(Error::Setup(format!(
                "Template file '{}' must contain a JSON Schema object, got {}",
                path,
                value_kind(&schema)
            )));
        }
        let validator = jsonschema::draft7::new(&schema).map_err(|e| {
            Error::Setup(format!(
                "Template file '{}' is not a usable JSON Schema: {}",
                path, e
            ))
        })?;
        Ok((schema, validator))
    }

    /// Build fresh state for `config`, then swap it in
    ///
    /// The previous sink, if any, is closed only after the new input has
    /// loaded, so a failed reload leaves the node usable.
    fn apply_config(&mut self, config: StubSourceConfig) -> Result<()> {
        let state = match config.output_mode {
            OutputMode::Echo => {
                let events = Self::load_events(&config.input_json_events_file_path)?;
                let progress = if events.is_empty() {
                    EchoProgress::Exhausted
                } else {
                    EchoProgress::Pending { index: 0 }
                };
                info!(
                    "Loaded {} recorded events from '{}'",
                    events.len(),
                    config.input_json_events_file_path
                );
                SourceState::Echo { events, progress }
            }
            OutputMode::Random => {
                let (schema, validator) =
                    Self::load_template(&config.input_json_template_file_path)?;
                info!(
                    "Loaded event template from '{}'",
                    config.input_json_template_file_path
                );
                SourceState::Random {
                    generator: SchemaGenerator::new(schema),
                    validator,
                }
            }
        };

        let sink = JsonlSink::open(&config.output_json_path).map_err(|e| {
            Error::Setup(format!(
                "Cannot open output file '{}': {}",
                config.output_json_path, e
            ))
        })?;

        if let Some(old) = self.sink.take() {
            if let Err(e) = old.close() {
                warn!("Closing previous output file failed: {}", e);
            }
        }
        self.config = config;
        self.state = Some(state);
        self.sink = Some(sink);
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<Value>> {
        let debug_enabled = self.config.debug;
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| Error::Execution("Stub source processed before setup".to_string()))?;

        match state {
            SourceState::Echo { events, progress } => match *progress {
                EchoProgress::Pending { index } => {
                    // Pending always holds index < events.len()
                    let event = events[index].clone();
                    let next = index + 1;
                    *progress = if next >= events.len() {
                        info!("All {} recorded events processed", events.len());
                        EchoProgress::Exhausted
                    } else {
                        EchoProgress::Pending { index: next }
                    };
                    Ok(Some(event))
                }
                EchoProgress::Exhausted => Ok(None),
            },
            SourceState::Random {
                generator,
                validator,
            } => {
                let event = generator.generate();
                if debug_enabled {
                    if let Err(error) = validator.validate(&event) {
                        warn!("Generated event violates the template: {}", error);
                    }
                }
                Ok(Some(event))
            }
        }
    }

    fn emit(&mut self, event: &Value) -> Result<()> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| Error::Execution("Output sink is not open".to_string()))?;
        sink.emit(event)?;
        if self.config.debug {
            debug!("Emitted event: {}", event);
        }
        Ok(())
    }
}

impl Default for StubSourceNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceNode for StubSourceNode {
    fn node_type(&self) -> &str {
        "StubSource"
    }

    async fn setup(&mut self, context: &NodeContext) -> Result<()> {
        let config = match &context.params {
            Value::Object(map) if !map.is_empty() => config::normalize(map)?,
            // Empty or absent params keep the configuration the node was
            // constructed with (the factory already normalized it).
            Value::Object(_) | Value::Null => self.config.clone(),
            other => {
                return Err(Error::Validation(format!(
                    "Invalid params: expected an object, got {}",
                    value_kind(other)
                )))
            }
        };
        self.apply_config(config)?;
        info!(
            "StubSource '{}' ready in {} mode (forward_upstream_data={})",
            context.node_id, self.config.output_mode, self.config.forward_upstream_data
        );
        Ok(())
    }

    async fn process(&mut self, frames: FrameBatch) -> Result<FrameBatch> {
        if self.state.is_none() {
            return Err(Error::Execution(
                "Stub source processed before setup".to_string(),
            ));
        }
        if self.sink.is_none() {
            return Err(Error::Execution("Output sink is not open".to_string()));
        }
        if frames.is_empty() {
            trace!("Empty input batch, nothing to emit");
            return Ok(frames);
        }
        trace!(
            "Tick with {} input frames: {:?}",
            frames.len(),
            frames.keys().collect::<Vec<_>>()
        );

        if let Some(event) = self.next_event()? {
            self.emit(&event)?;
        }

        // Image frames never travel through the stub; the rest pass through
        // unchanged when forwarding is on.
        let forward = self.config.forward_upstream_data;
        Ok(frames
            .into_iter()
            .filter(|(_, frame)| forward && !frame.has_image())
            .collect())
    }

    async fn shutdown(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            sink.close()?;
            info!("StubSource shut down, output file closed");
        }
        Ok(())
    }
}

/// Factory producing [`StubSourceNode`] instances from raw pipeline params
pub struct StubSourceNodeFactory;

impl NodeFactory for StubSourceNodeFactory {
    fn create(&self, params: &Value) -> Result<Box<dyn SourceNode>> {
        let config = config::normalize_value(params)?;
        Ok(Box::new(StubSourceNode::with_config(config)))
    }

    fn node_type(&self) -> &str {
        "StubSource"
    }
}
