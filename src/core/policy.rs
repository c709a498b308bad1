//! # Interrupt Policy
//!
//! Decides whether Escape / Ctrl-C end the process on the bridge's own
//! authority, or are just keys for the application to interpret.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::terminal::decoder::{Keystroke, Resolution};
use crate::terminal::keys::KeyEvent;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterruptPolicy {
    /// The bridge terminates on a standalone Escape or Ctrl-C.
    #[default]
    Bridge,
    /// The application has claimed key control; only its `Exit` ends the run.
    Application,
}

impl InterruptPolicy {
    /// True if this keystroke should terminate the process.
    ///
    /// Only keys resolved on their own count. An ESC flushed out of a broken
    /// sequence (`ESC [ Z`, Alt-chords) is never an interrupt.
    pub fn is_interrupt(self, stroke: &Keystroke) -> bool {
        self == InterruptPolicy::Bridge
            && stroke.resolution == Resolution::Key
            && matches!(stroke.key, KeyEvent::Escape | KeyEvent::Ctrl('c'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(key: KeyEvent, resolution: Resolution) -> Keystroke {
        Keystroke { key, resolution, width: 1 }
    }

    #[test]
    fn test_bridge_policy_interrupts_on_standalone_keys() {
        let policy = InterruptPolicy::Bridge;
        assert!(policy.is_interrupt(&stroke(KeyEvent::Escape, Resolution::Key)));
        assert!(policy.is_interrupt(&stroke(KeyEvent::Ctrl('c'), Resolution::Key)));
        assert!(!policy.is_interrupt(&stroke(KeyEvent::Ctrl('d'), Resolution::Key)));
        assert!(!policy.is_interrupt(&stroke(KeyEvent::Char('c'), Resolution::Key)));
    }

    #[test]
    fn test_fallback_escape_is_not_an_interrupt() {
        let policy = InterruptPolicy::Bridge;
        assert!(!policy.is_interrupt(&stroke(KeyEvent::Escape, Resolution::Fallback)));
    }

    #[test]
    fn test_application_policy_never_interrupts() {
        let policy = InterruptPolicy::Application;
        assert!(!policy.is_interrupt(&stroke(KeyEvent::Escape, Resolution::Key)));
        assert!(!policy.is_interrupt(&stroke(KeyEvent::Ctrl('c'), Resolution::Key)));
    }
}
