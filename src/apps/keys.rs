//! Key viewer.
//!
//! Prints one line per decoded key. It claims key control (interrupts
//! default to `application` under `--app keys`): `q` exits 0 and a digit
//! `1`-`9` exits with that status.

use crate::core::app::{Application, Outbox};
use crate::core::message::{Flags, Inbound};
use crate::terminal::keys::KeyEvent;

pub struct KeyViewerApp {
    outbox: Outbox,
    count: usize,
}

impl KeyViewerApp {
    pub fn new(flags: Flags, outbox: Outbox) -> Self {
        let started = flags
            .started_at()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| flags.started_at_ms.to_string());
        outbox.write(format!(
            "termbridge key viewer, started {started}\r\nq quits, 1-9 exits with that status\r\n"
        ));
        Self { outbox, count: 0 }
    }
}

impl Application for KeyViewerApp {
    fn update(&mut self, msg: Inbound) {
        let Inbound::Key(key) = msg else {
            return;
        };
        match key {
            KeyEvent::Char('q') => self.outbox.exit(None),
            KeyEvent::Char(c @ '1'..='9') => self.outbox.exit(c.to_digit(10).map(|d| d as i32)),
            other => {
                self.count += 1;
                self.outbox.write(format!("{:>4}  {other}\r\n", self.count));
            }
        }
    }
}
