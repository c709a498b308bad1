//! # Terminal Adapter
//!
//! Everything that touches the terminal device lives here: entering and
//! leaving raw mode, turning stdin bytes into keys, writing to stdout, and
//! noticing OS termination signals.
//!
//! This is the only module that knows about crossterm.

pub mod decoder;
pub mod keys;
pub mod raw_mode;
pub mod signals;
pub mod writer;

pub use decoder::{DecodedEvent, InputDecoder, Keystroke, Resolution};
pub use keys::{CursorKey, KeyEvent, Modifiers};
pub use raw_mode::{CrosstermBackend, ModeBackend, RawModeController, TerminalMode};
pub use signals::TerminationSignal;
pub use writer::{Buffering, OutputWriter};
