//! # Raw Mode Controller
//!
//! Owns the one terminal session of the process. Raw mode is entered at most
//! once and restored at most once, however many exit paths ask for it.
//!
//! ```text
//! Idle ──acquire()──▶ Raw { snapshot } ──release()──▶ Restored
//!                                                       │
//!                       release() / acquire() again: no-op
//! ```
//!
//! The controller is a cheap clone around shared state so that the panic
//! hook, the drop guard and the bridge can all reach the same session.

use std::io::{self, IsTerminal};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::core::error::BridgeError;

/// Terminal mode switching, behind a trait so tests can record calls.
pub trait ModeBackend: Send + Sync {
    /// True if the process has a controlling terminal on stdin.
    fn is_terminal(&self) -> bool;
    fn is_raw(&self) -> io::Result<bool>;
    fn enable_raw(&self) -> io::Result<()>;
    fn disable_raw(&self) -> io::Result<()>;
}

/// The real terminal, via crossterm.
#[derive(Debug, Default)]
pub struct CrosstermBackend;

impl ModeBackend for CrosstermBackend {
    fn is_terminal(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn is_raw(&self) -> io::Result<bool> {
        crossterm::terminal::is_raw_mode_enabled()
    }

    fn enable_raw(&self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    fn disable_raw(&self) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }
}

/// Mode observed before raw mode was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSnapshot {
    pub was_raw: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Raw(ModeSnapshot),
    Restored,
}

/// Current mode as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalMode {
    Cooked,
    Raw,
}

struct TerminalSession {
    backend: Box<dyn ModeBackend>,
    state: Mutex<SessionState>,
}

#[derive(Clone)]
pub struct RawModeController {
    session: Arc<TerminalSession>,
}

impl RawModeController {
    pub fn new(backend: Box<dyn ModeBackend>) -> Self {
        Self {
            session: Arc::new(TerminalSession {
                backend,
                state: Mutex::new(SessionState::Idle),
            }),
        }
    }

    /// Controller for the process's real terminal.
    pub fn for_stdin() -> Self {
        Self::new(Box::new(CrosstermBackend))
    }

    /// Snapshot the current mode and switch to raw mode.
    ///
    /// Fails with `TerminalUnavailable` before touching anything if there is
    /// no controlling terminal. Calling it again after success is a no-op.
    pub fn acquire(&self) -> Result<(), BridgeError> {
        let mut state = self.lock();
        if *state != SessionState::Idle {
            debug!("Raw mode acquire ignored, session is {:?}", *state);
            return Ok(());
        }

        let backend = &self.session.backend;
        if !backend.is_terminal() {
            return Err(BridgeError::TerminalUnavailable(
                "stdin is not a terminal".to_string(),
            ));
        }
        let was_raw = backend
            .is_raw()
            .map_err(|e| BridgeError::TerminalUnavailable(e.to_string()))?;
        if !was_raw {
            backend
                .enable_raw()
                .map_err(|e| BridgeError::TerminalUnavailable(e.to_string()))?;
        }

        *state = SessionState::Raw(ModeSnapshot { was_raw });
        info!("Raw mode acquired (was_raw={})", was_raw);
        Ok(())
    }

    /// Restore the snapshotted mode. Returns true only on the call that
    /// actually restored; every later call is a no-op.
    pub fn release(&self) -> bool {
        let mut state = self.lock();
        let SessionState::Raw(snapshot) = *state else {
            return false;
        };

        if !snapshot.was_raw
            && let Err(e) = self.session.backend.disable_raw()
        {
            warn!("Failed to restore terminal mode: {}", e);
        }
        *state = SessionState::Restored;
        info!("Terminal mode restored");
        true
    }

    pub fn mode(&self) -> TerminalMode {
        match *self.lock() {
            SessionState::Raw(_) => TerminalMode::Raw,
            SessionState::Idle | SessionState::Restored => TerminalMode::Cooked,
        }
    }

    /// Guard that releases the session when dropped, covering early returns
    /// and unwinding.
    pub fn guard(&self) -> RestoreGuard {
        RestoreGuard {
            controller: self.clone(),
        }
    }

    /// Chain a panic hook that restores the terminal before the previous
    /// hook prints the panic message.
    pub fn install_panic_hook(&self) {
        let controller = self.clone();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            controller.release();
            previous(info);
        }));
    }

    // A panic while holding the lock must not block the restore path.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.session
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RawModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawModeController")
            .field("state", &*self.lock())
            .finish()
    }
}

pub struct RestoreGuard {
    controller: RawModeController,
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        self.controller.release();
    }
}
