//! FramePipe Core - frame model and node lifecycle contract
//!
//! This crate provides the shared pieces every FramePipe node builds on:
//!
//! - [`Frame`] / [`FrameBatch`]: the payload unit exchanged between stages
//! - [`SourceNode`] / [`NodeContext`]: the setup/process/shutdown lifecycle
//!   contract a host runtime drives once per pipeline tick
//! - [`NodeFactory`]: the construction seam from raw manifest params
//! - [`Error`] / [`Result`]: the shared error taxonomy
//!
//! Transports, scheduling, and node discovery belong to host runtimes;
//! this crate has no opinion about them.
//!
//! # Example
//!
//! ```ignore
//! use framepipe_core::{FrameBatch, NodeContext, SourceNode};
//!
//! async fn drive(node: &mut dyn SourceNode, ctx: &NodeContext) -> framepipe_core::Result<()> {
//!     node.setup(ctx).await?;
//!     let out = node.process(FrameBatch::new()).await?;
//!     assert!(out.is_empty());
//!     node.shutdown().await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod frame;
pub mod node;

// Error types
mod error;
pub use error::{Error, Result};

pub use frame::{Frame, FrameBatch, ImageBuffer};
pub use node::{NodeContext, NodeFactory, SourceNode};

/// Initialize logging for FramePipe binaries
///
/// This should be called once at startup to initialize logging.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("FramePipe core initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        // Should not panic
        init().ok();
    }
}
