use std::fmt;
use std::io;

/// Fatal conditions. Every one of these ends the run after mode restoration.
///
/// Malformed escape sequences are not here: the decoder recovers from them
/// locally by flushing literal bytes.
#[derive(Debug)]
pub enum BridgeError {
    /// No controlling terminal, or raw mode could not be entered.
    TerminalUnavailable(String),
    /// The output sink rejected a write or flush.
    OutputDeviceFailure(io::Error),
    /// Reading the input stream failed.
    InputFailure(io::Error),
    /// OS signal handlers could not be registered.
    SignalSetup(io::Error),
}

impl BridgeError {
    /// Process status for a fatal exit.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::TerminalUnavailable(msg) => write!(f, "terminal unavailable: {msg}"),
            BridgeError::OutputDeviceFailure(e) => write!(f, "output device failure: {e}"),
            BridgeError::InputFailure(e) => write!(f, "input failure: {e}"),
            BridgeError::SignalSetup(e) => write!(f, "signal setup failed: {e}"),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BridgeError::TerminalUnavailable(_) => None,
            BridgeError::OutputDeviceFailure(e)
            | BridgeError::InputFailure(e)
            | BridgeError::SignalSetup(e) => Some(e),
        }
    }
}
