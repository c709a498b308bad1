//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::app::{Application, Outbox};
use crate::core::message::{Flags, Inbound};
use crate::terminal::keys::KeyEvent;
use crate::terminal::raw_mode::ModeBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCall {
    Enable,
    Disable,
}

/// A fake terminal that records every mode switch.
#[derive(Clone)]
pub struct RecordingBackend {
    tty: bool,
    raw: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<ModeCall>>>,
}

impl RecordingBackend {
    pub fn tty() -> Self {
        Self {
            tty: true,
            raw: Arc::new(AtomicBool::new(false)),
            calls: Arc::default(),
        }
    }

    pub fn no_tty() -> Self {
        Self { tty: false, ..Self::tty() }
    }

    pub fn set_raw(&self, raw: bool) {
        self.raw.store(raw, Ordering::SeqCst);
    }

    pub fn is_raw_now(&self) -> bool {
        self.raw.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<ModeCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ModeBackend for RecordingBackend {
    fn is_terminal(&self) -> bool {
        self.tty
    }

    fn is_raw(&self) -> io::Result<bool> {
        Ok(self.is_raw_now())
    }

    fn enable_raw(&self) -> io::Result<()> {
        self.calls.lock().unwrap().push(ModeCall::Enable);
        self.set_raw(true);
        Ok(())
    }

    fn disable_raw(&self) -> io::Result<()> {
        self.calls.lock().unwrap().push(ModeCall::Disable);
        self.set_raw(false);
        Ok(())
    }
}

/// An in-memory output device that can be inspected after the writer moved.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An output device that is gone.
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
    }
}

/// Scriptable application that records what it receives.
///
/// On its `exit_on` key it writes `bye`, requests exit, then writes `late`
/// (which must never reach the terminal). With `tick` set it also writes
/// `tick` from a background task at that interval.
#[derive(Clone, Default)]
pub struct Script {
    pub echo: bool,
    pub exit_on: Option<(KeyEvent, Option<i32>)>,
    pub greeting: Vec<&'static str>,
    pub tick: Option<Duration>,
    pub seen: Arc<Mutex<Vec<Inbound>>>,
    pub flags: Arc<Mutex<Option<Flags>>>,
}

pub struct ScriptedApp {
    script: Script,
    outbox: Outbox,
}

impl Script {
    pub fn init(&self) -> impl FnOnce(Flags, Outbox) -> ScriptedApp + use<> {
        let script = self.clone();
        move |flags, outbox| {
            *script.flags.lock().unwrap() = Some(flags);
            for line in &script.greeting {
                outbox.write(*line);
            }
            if let Some(period) = script.tick {
                let ticker = outbox.clone();
                tokio::spawn(async move {
                    loop {
                        tokio::time::sleep(period).await;
                        ticker.write("tick");
                    }
                });
            }
            ScriptedApp { script, outbox }
        }
    }

    pub fn seen(&self) -> Vec<Inbound> {
        self.seen.lock().unwrap().clone()
    }

    pub fn flags(&self) -> Option<Flags> {
        *self.flags.lock().unwrap()
    }
}

impl Application for ScriptedApp {
    fn update(&mut self, msg: Inbound) {
        self.script.seen.lock().unwrap().push(msg.clone());
        match msg {
            Inbound::Raw(bytes) if self.script.echo => self.outbox.write(bytes),
            Inbound::Key(key) => {
                if let Some((exit_key, code)) = self.script.exit_on
                    && exit_key == key
                {
                    self.outbox.write("bye");
                    self.outbox.exit(code);
                    self.outbox.write("late");
                }
            }
            Inbound::Raw(_) => {}
        }
    }
}
