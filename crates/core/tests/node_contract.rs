//! Contract tests for the node lifecycle trait
//!
//! Run with:
//! ```sh
//! cargo test -p framepipe-core --test node_contract
//! ```

use async_trait::async_trait;
use framepipe_core::{
    Error, Frame, FrameBatch, ImageBuffer, NodeContext, NodeFactory, Result, SourceNode,
};
use serde_json::{json, Value};

/// Minimal node that tracks lifecycle state and echoes frames through
struct CountingNode {
    ready: bool,
    ticks: usize,
}

impl CountingNode {
    fn new() -> Self {
        Self {
            ready: false,
            ticks: 0,
        }
    }
}

#[async_trait]
impl SourceNode for CountingNode {
    fn node_type(&self) -> &str {
        "Counting"
    }

    async fn setup(&mut self, context: &NodeContext) -> Result<()> {
        if context.params.is_object() || context.params.is_null() {
            self.ready = true;
            Ok(())
        } else {
            Err(Error::Validation("params must be an object".to_string()))
        }
    }

    async fn process(&mut self, frames: FrameBatch) -> Result<FrameBatch> {
        if !self.ready {
            return Err(Error::Execution("not initialized".to_string()));
        }
        self.ticks += 1;
        Ok(frames)
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.ready = false;
        Ok(())
    }
}

struct CountingNodeFactory;

impl NodeFactory for CountingNodeFactory {
    fn create(&self, params: &Value) -> Result<Box<dyn SourceNode>> {
        if params.is_object() || params.is_null() {
            Ok(Box::new(CountingNode::new()))
        } else {
            Err(Error::Validation("params must be an object".to_string()))
        }
    }

    fn node_type(&self) -> &str {
        "Counting"
    }
}

#[tokio::test]
async fn lifecycle_runs_through_a_boxed_node() {
    let factory = CountingNodeFactory;
    assert_eq!(factory.node_type(), "Counting");

    let mut node = factory.create(&json!({})).unwrap();
    assert_eq!(node.node_type(), "Counting");

    node.setup(&NodeContext::new("n1", json!({}))).await.unwrap();

    let mut frames = FrameBatch::new();
    frames.insert("main".to_string(), Frame::with_data(json!({"x": 1})));
    let out = node.process(frames).await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out.get("main"), Some(&Frame::with_data(json!({"x": 1}))));

    node.shutdown().await.unwrap();
}

#[tokio::test]
async fn factory_rejects_non_object_params() {
    let factory = CountingNodeFactory;
    let err = factory
        .create(&json!("nope"))
        .err()
        .expect("expected a validation error");
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn process_after_shutdown_errors() {
    let mut node = CountingNode::new();
    node.setup(&NodeContext::new("n1", Value::Null)).await.unwrap();
    node.shutdown().await.unwrap();

    let err = node.process(FrameBatch::new()).await.unwrap_err();
    assert!(matches!(err, Error::Execution(_)));
}

#[test]
fn frames_report_image_presence() {
    let data = Frame::with_data(json!({"x": 1}));
    assert!(!data.has_image());
    assert_eq!(data.data, Some(json!({"x": 1})));

    let image = Frame::with_image(ImageBuffer::new(4, 2, vec![0; 24]));
    assert!(image.has_image());
    assert!(image.data.is_none());
}
