//! Configurable stub data source for FramePipe pipelines
//!
//! A development and testing source that stands in for a real capture
//! node. In ECHO mode it replays a recorded JSON event sequence exactly
//! once; in RANDOM mode it synthesizes events from a JSON Schema
//! template on every tick. Emitted events are appended to a JSONL file,
//! and non-image upstream frames pass through when forwarding is enabled.
//!
//! ```ignore
//! use framepipe_core::{NodeContext, SourceNode};
//! use framepipe_stub_source::StubSourceNode;
//! use serde_json::json;
//!
//! let mut node = StubSourceNode::new();
//! let context = NodeContext::new("feed", json!({"output_mode": "echo"}));
//! node.setup(&context).await?;
//! while !node.all_events_processed() {
//!     node.process(tick_frames()).await?;
//! }
//! node.shutdown().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod generator;
pub mod node;
pub mod sink;

pub use config::{
    env_overrides, normalize, normalize_value, OutputMode, StubSourceConfig, ENV_VARS,
};
pub use generator::SchemaGenerator;
pub use node::{StubSourceNode, StubSourceNodeFactory};
pub use sink::JsonlSink;
