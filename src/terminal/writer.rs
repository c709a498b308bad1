//! Terminal output sink.
//!
//! Bytes pass through untouched: no line-ending translation, no escape
//! interpretation. Any write failure is fatal to the bridge.

use std::io::{self, LineWriter, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::error::BridgeError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Buffering {
    /// Flush after every payload.
    #[default]
    Unbuffered,
    /// Flush on newline (and on explicit flush).
    Line,
}

enum Sink<W: Write> {
    Direct(W),
    Line(LineWriter<W>),
}

pub struct OutputWriter<W: Write> {
    sink: Sink<W>,
    written: u64,
}

impl OutputWriter<io::Stdout> {
    pub fn stdout(buffering: Buffering) -> Self {
        Self::new(io::stdout(), buffering)
    }
}

impl<W: Write> OutputWriter<W> {
    pub fn new(inner: W, buffering: Buffering) -> Self {
        let sink = match buffering {
            Buffering::Unbuffered => Sink::Direct(inner),
            Buffering::Line => Sink::Line(LineWriter::new(inner)),
        };
        Self { sink, written: 0 }
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), BridgeError> {
        let result = match &mut self.sink {
            Sink::Direct(w) => w.write_all(bytes).and_then(|()| w.flush()),
            Sink::Line(w) => w.write_all(bytes),
        };
        result.map_err(BridgeError::OutputDeviceFailure)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), BridgeError> {
        let result = match &mut self.sink {
            Sink::Direct(w) => w.flush(),
            Sink::Line(w) => w.flush(),
        };
        result.map_err(BridgeError::OutputDeviceFailure)
    }

    /// Total bytes accepted so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}
