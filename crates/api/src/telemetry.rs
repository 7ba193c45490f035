//! Tracing subscriber setup.
//!
//! One `fmt` layer is installed per configured sink so the same events can go
//! to stdout and to a file at once. `RUST_LOG`, when set, wins over the
//! configured level.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogEncoding, LoggerConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Install the global subscriber described by `config`.
pub fn init(config: &LoggerConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log level {:?}", config.level))?;

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(config.output_paths.len());
    for sink in &config.output_paths {
        let (writer, ansi) = make_writer(sink)?;
        layers.push(fmt_layer(config.encoding, writer, ansi));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn make_writer(sink: &str) -> anyhow::Result<(BoxMakeWriter, bool)> {
    match sink {
        "stdout" => Ok((BoxMakeWriter::new(std::io::stdout), true)),
        "stderr" => Ok((BoxMakeWriter::new(std::io::stderr), true)),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {path}"))?;
            Ok((BoxMakeWriter::new(Mutex::new(file)), false))
        }
    }
}

fn fmt_layer(encoding: LogEncoding, writer: BoxMakeWriter, ansi: bool) -> BoxedLayer {
    match encoding {
        LogEncoding::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed(),
        LogEncoding::Console => tracing_subscriber::fmt::layer()
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
    }
}
