//! # Messages
//!
//! Everything crossing the application boundary is one of these values.
//! Input flows in as `Inbound`, output and exit requests flow out as `Outbound`.
//!
//! ```text
//! stdin  →  Inbound::Raw / Inbound::Key  →  app
//! app    →  Outbound::Write / Outbound::Exit  →  stdout / process exit
//! ```

use chrono::{DateTime, Utc};

use crate::terminal::keys::KeyEvent;

/// A value delivered to the application, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// An opaque chunk of raw input bytes.
    Raw(Vec<u8>),
    /// A decoded keypress (only when key decoding is enabled).
    Key(KeyEvent),
}

/// A value emitted by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Bytes written verbatim to the terminal.
    Write(Vec<u8>),
    /// Terminate the process. `None` means status 0.
    Exit(Option<i32>),
}

/// The single initialization value handed to the application constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// Wall-clock time at startup, milliseconds since the Unix epoch.
    pub started_at_ms: i64,
}

impl Flags {
    pub fn now() -> Self {
        Self {
            started_at_ms: Utc::now().timestamp_millis(),
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.started_at_ms)
    }
}
