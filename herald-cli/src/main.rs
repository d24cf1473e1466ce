//! Herald CLI - build event envelopes and exercise span tracking

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use herald_core::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "herald")]
#[command(about = "Herald event envelope and span tracking CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to herald.toml plus HERALD_ env overrides)
    #[arg(short, long, global = true, env = "HERALD_CONFIG_FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an event envelope and print it
    Emit {
        /// Event source (falls back to events.default_source)
        #[arg(short, long)]
        source: Option<String>,
        /// Event type
        #[arg(short = 't', long = "type")]
        event_type: Option<String>,
        /// Event ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Event subject
        #[arg(long)]
        subject: Option<String>,
        /// Data content type
        #[arg(long)]
        data_content_type: Option<String>,
        /// Data schema
        #[arg(long)]
        data_schema: Option<String>,
        /// Payload; parsed as JSON, otherwise used as a string
        #[arg(short, long)]
        data: Option<String>,
        /// Extension attribute as key=value (repeatable)
        #[arg(short = 'e', long = "ext")]
        extensions: Vec<String>,
        /// Output format: json, pretty or summary
        #[arg(short, long, default_value = "json")]
        format: String,
    },
    /// Run one span through its lifecycle
    Trace {
        /// Span name
        #[arg(short, long)]
        name: String,
        /// Attribute as key=value (repeatable)
        #[arg(short, long = "attr")]
        attributes: Vec<String>,
        /// Record a failure with this message before ending the span
        #[arg(long)]
        fail: Option<String>,
        /// Force tracing on regardless of configuration
        #[arg(long)]
        enable: bool,
        /// Print the exported records as JSON instead of logging them
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
    /// Version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HeraldConfig::from_file(path)?,
        None => HeraldConfig::load()?,
    };

    herald_core::logging::init(&config.logging)?;
    config.validate()?;

    match cli.command {
        Commands::Version => {
            println!("herald {}", env!("CARGO_PKG_VERSION"));
            println!("herald-core {}", herald_core::VERSION);
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Emit {
            source,
            event_type,
            id,
            subject,
            data_content_type,
            data_schema,
            data,
            extensions,
            format,
        } => {
            let format: EventFormat = format.parse()?;
            let mut builder = EnvelopeBuilder::from_config(&config.events);

            if let Some(source) = source {
                builder = builder.source(source);
            }
            if let Some(event_type) = event_type {
                builder = builder.event_type(event_type);
            }
            if let Some(id) = id {
                builder = builder.id(id);
            }
            if let Some(subject) = subject {
                builder = builder.subject(subject);
            }
            if let Some(data_content_type) = data_content_type {
                builder = builder.data_content_type(data_content_type);
            }
            if let Some(data_schema) = data_schema {
                builder = builder.data_schema(data_schema);
            }
            if let Some(data) = data {
                builder = builder.data(parse_value(&data));
            }
            for pair in &extensions {
                let (key, value) = split_pair(pair)?;
                builder = builder.extension(key, parse_value(value));
            }

            let event = builder.build().context("Invalid event")?;
            tracing::debug!(event_id = %event.id(), event_type = %event.event_type(), "Built event");
            println!("{}", EventExporter::export(&event, format)?);
        }
        Commands::Trace {
            name,
            attributes,
            fail,
            enable,
            json,
        } => {
            let output = run_trace(&config.tracing, &name, &attributes, fail, enable, json)?;
            println!("{}", output);
        }
    }

    Ok(())
}

/// Run one span through its lifecycle and render what the user sees.
///
/// With `json` the records go to a [`MemorySink`] with export forced on and
/// the result is their JSON array; otherwise they go to the log.
fn run_trace(
    config: &TracingConfig,
    name: &str,
    attributes: &[String],
    fail: Option<String>,
    enable: bool,
    json: bool,
) -> Result<String> {
    let mut tracing_config = config.clone();
    if enable {
        tracing_config.enabled = true;
    }

    let memory = Arc::new(MemorySink::new());
    let tracker = if json {
        tracing_config.export_enabled = true;
        SpanTracker::from_config_with_sink(&tracing_config, memory.clone())
    } else {
        SpanTracker::from_config(&tracing_config)
    };

    let span = tracker.create_span(name);
    for pair in attributes {
        let (key, value) = split_pair(pair)?;
        tracker.add_attribute(&span, key, value);
    }
    if let Some(message) = fail {
        let error = anyhow::anyhow!(message);
        tracker.record_exception(&span, &*error);
    }
    tracker.end_span(&span);

    if json {
        Ok(memory.to_json_pretty()?)
    } else if span.is_none() {
        Ok(format!("Tracing disabled; span '{}' was not recorded", name))
    } else {
        Ok(format!("Span '{}' completed: {}", name, span))
    }
}

/// Split `key=value`, rejecting an empty key
fn split_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("Expected key=value, got '{}'", pair),
    }
}

/// Interpret CLI input as JSON when it parses, else as a plain string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
