//! Pipeline frame payload model
//!
//! A [`Frame`] is the unit of payload exchanged between pipeline stages: an
//! optional image buffer, an optional JSON data payload, and an optional
//! format tag. Stub and analytics nodes mostly care about the data payload;
//! the image is opaque bytes and is never decoded here, only checked for
//! presence (e.g. for forwarding decisions).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Named frames passed through one process call
pub type FrameBatch = HashMap<String, Frame>;

/// Raw image payload attached to a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBuffer {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Packed pixel data
    pub pixels: Vec<u8>,
}

impl ImageBuffer {
    /// Create an image buffer from dimensions and packed pixel data
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// A unit of pipeline payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Visual payload, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageBuffer>,

    /// Structured data payload, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Format tag (e.g. "BGR", "jsonl")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Frame {
    /// Create an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame carrying only a data payload
    pub fn with_data(data: Value) -> Self {
        Self {
            image: None,
            data: Some(data),
            format: None,
        }
    }

    /// Create a frame carrying an image payload
    pub fn with_image(image: ImageBuffer) -> Self {
        Self {
            image: Some(image),
            data: None,
            format: None,
        }
    }

    /// True if this frame carries a visual payload
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
