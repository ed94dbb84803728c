//! FramePipe stub feed driver
//!
//! Drives a stub source node from the command line: optionally scaffolds
//! starter input files, ticks the node at a fixed interval, and appends
//! every emitted event to the JSONL output file.
//!
//! # Usage
//!
//! ```bash
//! # Write starter input files if missing, then replay them
//! stub-feed --scaffold
//!
//! # Synthesize 20 random events from the template
//! stub-feed --scaffold --output-mode random --ticks 20
//!
//! # Environment variables mirror the flags
//! STUB_SOURCE_OUTPUT_MODE=random stub-feed --ticks 5
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use framepipe_core::{Frame, FrameBatch, NodeContext, SourceNode};
use framepipe_stub_source::{config, StubSourceConfig, StubSourceNode};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Feed a pipeline with recorded or synthesized JSON events
#[derive(Parser)]
#[command(name = "stub-feed")]
#[command(author, version)]
#[command(about = "Feed a pipeline with recorded or synthesized JSON events")]
struct Args {
    /// Emission mode: echo or random
    #[arg(long, env = "STUB_SOURCE_OUTPUT_MODE")]
    output_mode: Option<String>,

    /// Verbose per-event logging (true/1/yes or false/0/no)
    #[arg(long, env = "STUB_SOURCE_DEBUG")]
    debug: Option<String>,

    /// Forward non-image upstream frames downstream (true/1/yes or false/0/no)
    #[arg(long, env = "STUB_SOURCE_FORWARD_UPSTREAM_DATA")]
    forward_upstream_data: Option<String>,

    /// JSONL output destination
    #[arg(long, env = "STUB_SOURCE_OUTPUT_JSON_PATH")]
    output_json_path: Option<String>,

    /// Events file replayed in echo mode
    #[arg(long, env = "STUB_SOURCE_INPUT_JSON_EVENTS_FILE_PATH")]
    input_json_events_file_path: Option<String>,

    /// JSON Schema template used in random mode
    #[arg(long, env = "STUB_SOURCE_INPUT_JSON_TEMPLATE_FILE_PATH")]
    input_json_template_file_path: Option<String>,

    /// Number of ticks to run (0 = until the recorded events drain, or
    /// forever in random mode)
    #[arg(long, default_value_t = 0)]
    ticks: u64,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 250)]
    interval_ms: u64,

    /// Write starter input files if they are missing, then run
    #[arg(long)]
    scaffold: bool,
}

fn insert_if_set(raw: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        raw.insert(key.to_string(), Value::String(value.clone()));
    }
}

fn starter_events() -> Value {
    json!([
        {"id": "e1", "kind": "created", "level": 1},
        {"id": "e2", "kind": "updated", "level": 2},
        {"id": "e3", "kind": "deleted", "level": 3}
    ])
}

fn starter_template() -> Value {
    json!({
        "type": "object",
        "properties": {
            "event_id": {"type": "string", "pattern": "^event_[0-9]{4}$"},
            "kind": {"type": "string", "enum": ["created", "updated", "deleted"]},
            "level": {"type": "integer", "minimum": 1, "maximum": 5},
            "message": {"type": "string", "minLength": 8, "maxLength": 32},
            "created_at": {"type": "string", "format": "date-time"}
        },
        "required": ["event_id", "kind", "level"],
        "additionalProperties": false
    })
}

/// Write `contents` to `path` unless the file already exists
fn write_if_absent(path: &str, contents: &Value) -> Result<bool> {
    let path = Path::new(path);
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(contents)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(true)
}

fn scaffold(config: &StubSourceConfig) -> Result<()> {
    if write_if_absent(&config.input_json_events_file_path, &starter_events())? {
        info!(
            "Wrote starter events to '{}'",
            config.input_json_events_file_path
        );
    }
    if write_if_absent(&config.input_json_template_file_path, &starter_template())? {
        info!(
            "Wrote starter template to '{}'",
            config.input_json_template_file_path
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    framepipe_core::init()?;

    let mut raw = Map::new();
    insert_if_set(&mut raw, "output_mode", &args.output_mode);
    insert_if_set(&mut raw, "debug", &args.debug);
    insert_if_set(&mut raw, "forward_upstream_data", &args.forward_upstream_data);
    insert_if_set(&mut raw, "output_json_path", &args.output_json_path);
    insert_if_set(
        &mut raw,
        "input_json_events_file_path",
        &args.input_json_events_file_path,
    );
    insert_if_set(
        &mut raw,
        "input_json_template_file_path",
        &args.input_json_template_file_path,
    );
    let config = config::normalize(&raw).context("Invalid stub source configuration")?;

    if args.scaffold {
        scaffold(&config)?;
    }

    let mut node = StubSourceNode::with_config(config);
    node.setup(&NodeContext::new("stub-feed", Value::Null))
        .await
        .context("Stub source setup failed")?;

    let interval = Duration::from_millis(args.interval_ms);
    let mut ticks_run = 0u64;
    loop {
        if args.ticks > 0 && ticks_run >= args.ticks {
            break;
        }
        if node.all_events_processed() {
            info!("Recorded events drained after {} ticks", ticks_run);
            break;
        }

        let mut frames = FrameBatch::new();
        frames.insert(
            "tick".to_string(),
            Frame::with_data(json!({
                "tick": ticks_run,
                "ts": chrono::Utc::now().to_rfc3339(),
            })),
        );
        let forwarded = node
            .process(frames)
            .await
            .context("Stub source tick failed")?;
        if !forwarded.is_empty() {
            debug!(
                "Forwarded {} frames: {:?}",
                forwarded.len(),
                forwarded.keys().collect::<Vec<_>>()
            );
        }
        ticks_run += 1;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    node.shutdown().await.context("Stub source shutdown failed")?;
    info!(
        "Done after {} ticks, output at '{}'",
        ticks_run,
        node.config().output_json_path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_if_absent_creates_and_preserves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("input/events.json")
            .to_string_lossy()
            .into_owned();

        assert!(write_if_absent(&path, &starter_events()).unwrap());
        let first = std::fs::read_to_string(&path).unwrap();

        // A second call must not clobber the existing file
        assert!(!write_if_absent(&path, &json!([])).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_starter_files_are_well_formed() {
        let events = starter_events();
        assert!(events.as_array().is_some_and(|a| !a.is_empty()));

        let template = starter_template();
        assert_eq!(template["type"], "object");
        assert!(template["properties"].is_object());
    }
}
