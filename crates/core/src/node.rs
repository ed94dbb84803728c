//! Node lifecycle contract
//!
//! Nodes implement [`SourceNode`] to participate in a host pipeline: the
//! host calls `setup` once, `process` once per tick, and `shutdown` once,
//! strictly in sequence. Methods take `&mut self`, so a node never needs
//! internal locking.

use crate::frame::FrameBatch;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Node execution context handed to `setup`
#[derive(Debug, Clone)]
pub struct NodeContext {
    /// Node ID assigned by the host
    pub node_id: String,

    /// Raw node parameters from the host (string-keyed map, possibly
    /// carrying env-sourced string values)
    pub params: Value,
}

impl NodeContext {
    /// Create a context from a node id and raw params
    pub fn new(node_id: impl Into<String>, params: Value) -> Self {
        Self {
            node_id: node_id.into(),
            params,
        }
    }
}

/// Node lifecycle trait
///
/// The host guarantees sequential calls; no method is re-entered while a
/// previous call is in flight.
#[async_trait]
pub trait SourceNode: Send {
    /// Node type name (stable identifier used in manifests)
    fn node_type(&self) -> &str;

    /// Initialize the node from its context
    ///
    /// Called once before any processing, and possibly again to re-derive
    /// state from a newer configuration. Use this to:
    /// - Validate and normalize configuration
    /// - Load input files
    /// - Open output destinations
    async fn setup(&mut self, context: &NodeContext) -> Result<()>;

    /// Process one tick of named input frames
    ///
    /// Returns the frames to pass downstream. An empty input map is a
    /// no-op tick, not an error.
    async fn process(&mut self, frames: FrameBatch) -> Result<FrameBatch>;

    /// Release resources
    ///
    /// Must be safe to call multiple times, and safe to call when `setup`
    /// never completed.
    async fn shutdown(&mut self) -> Result<()>;
}

/// Factory for creating node instances from raw manifest params
pub trait NodeFactory: Send + Sync {
    /// Create a node from raw params, validating them up front
    fn create(&self, params: &Value) -> Result<Box<dyn SourceNode>>;

    /// Node type this factory creates
    fn node_type(&self) -> &str;
}
