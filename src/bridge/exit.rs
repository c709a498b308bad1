use std::fmt;

use crate::terminal::keys::KeyEvent;
use crate::terminal::signals::TerminationSignal;

/// Why the bridge stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The bridge saw an interrupt key it owns.
    Interrupt(KeyEvent),
    /// The application sent `Outbound::Exit`.
    Requested,
    /// An OS termination signal arrived.
    Signal(TerminationSignal),
    /// stdin reached end of file.
    InputClosed,
}

/// Outcome of a bridge run that ended normally. The terminal has already
/// been restored by the time one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    pub code: i32,
    pub reason: ExitReason,
}

impl ExitStatus {
    pub fn interrupted(key: KeyEvent) -> Self {
        Self {
            code: 0,
            reason: ExitReason::Interrupt(key),
        }
    }

    pub fn requested(code: Option<i32>) -> Self {
        Self {
            code: code.unwrap_or(0),
            reason: ExitReason::Requested,
        }
    }

    pub fn signalled(signal: TerminationSignal) -> Self {
        Self {
            code: signal.exit_code(),
            reason: ExitReason::Signal(signal),
        }
    }

    pub fn input_closed() -> Self {
        Self {
            code: 0,
            reason: ExitReason::InputClosed,
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Interrupt(key) => write!(f, "interrupt key {key}"),
            ExitReason::Requested => f.write_str("application exit request"),
            ExitReason::Signal(signal) => write!(f, "{signal}"),
            ExitReason::InputClosed => f.write_str("end of input"),
        }
    }
}
