//! # Bridge
//!
//! Owns the application and shuttles messages between it and the terminal.
//!
//! ## Event Loop
//!
//! One `select!` on a single logical thread, checked in this order:
//!
//! 1. **OS signal**: restore and exit with 128 + signal number.
//! 2. **Outbound message** emitted asynchronously by the application.
//! 3. **stdin read**: each byte goes through the decoder, then the results
//!    are dispatched to the application.
//! 4. **Escape timer** (only while a prefix is pending): flush the decoder
//!    once no input byte has arrived for `escape_timeout`.
//!
//! After every `update()` the application's queued output is drained before
//! the next input is looked at, so output never interleaves with later input.
//!
//! ## Raw Byte Forwarding
//!
//! Raw bytes are held while the decoder is mid-sequence and released together
//! with the key they resolve to. Bytes of a bridge-owned interrupt key are
//! never forwarded: the run ends there.

mod exit;

pub use exit::{ExitReason, ExitStatus};

use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use crate::core::app::{AppHandle, Application, Outbox};
use crate::core::config::ResolvedConfig;
use crate::core::error::BridgeError;
use crate::core::message::{Flags, Inbound, Outbound};
use crate::core::policy::InterruptPolicy;
use crate::terminal::decoder::{DecodedEvent, InputDecoder};
use crate::terminal::raw_mode::RawModeController;
use crate::terminal::signals::TerminationSignal;
use crate::terminal::writer::OutputWriter;

const READ_CHUNK: usize = 1024;

/// The subset of the resolved config the loop needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeSettings {
    pub interrupts: InterruptPolicy,
    /// Forward decoded keys to the application.
    pub decode_keys: bool,
    pub escape_timeout: Duration,
}

impl From<&ResolvedConfig> for BridgeSettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            interrupts: config.interrupts,
            decode_keys: config.decode_keys,
            escape_timeout: config.escape_timeout,
        }
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self::from(&ResolvedConfig::default())
    }
}

pub struct Bridge<W: Write> {
    settings: BridgeSettings,
    session: RawModeController,
    writer: OutputWriter<W>,
    decoder: InputDecoder,
    /// Raw bytes not yet claimed by a resolved key.
    held: VecDeque<u8>,
    events: Vec<DecodedEvent>,
}

impl<W: Write> Bridge<W> {
    pub fn new(settings: BridgeSettings, session: RawModeController, writer: OutputWriter<W>) -> Self {
        // Interrupt detection needs keys even when the application does not.
        let decoding = settings.decode_keys || settings.interrupts == InterruptPolicy::Bridge;
        Self {
            settings,
            session,
            writer,
            decoder: InputDecoder::new(decoding),
            held: VecDeque::new(),
            events: Vec::with_capacity(READ_CHUNK * 2),
        }
    }

    /// Run until an exit path is taken.
    ///
    /// Raw mode is acquired first; the terminal is restored before this
    /// returns on every path, `Err` included.
    pub async fn run<A, R>(
        mut self,
        init: impl FnOnce(Flags, Outbox) -> A,
        flags: Flags,
        mut input: R,
        mut signals: UnboundedReceiver<TerminationSignal>,
    ) -> Result<ExitStatus, BridgeError>
    where
        A: Application,
        R: AsyncRead + Unpin,
    {
        let _restore = self.session.guard();
        self.session.acquire()?;

        let mut app = AppHandle::start(init, flags);
        info!(
            "Application started (started_at_ms={}, interrupts={:?}, decode_keys={})",
            flags.started_at_ms, self.settings.interrupts, self.settings.decode_keys
        );
        if let Some(status) = self.pump(&mut app)? {
            return Ok(self.shutdown(status));
        }

        let mut buf = [0u8; READ_CHUNK];
        let escape_timeout = self.settings.escape_timeout;
        // Measured from the last input byte; app output must not push it back.
        let mut escape_deadline: Option<Instant> = None;

        loop {
            if !self.decoder.has_pending() {
                escape_deadline = None;
            } else if escape_deadline.is_none() {
                escape_deadline = Some(Instant::now() + escape_timeout);
            }
            let pending = escape_deadline.is_some();
            let flush_at = escape_deadline.unwrap_or_else(Instant::now);

            let status = tokio::select! {
                biased;

                Some(signal) = signals.recv() => Some(ExitStatus::signalled(signal)),

                Some(msg) = app.next() => self.deliver(msg)?,

                read = input.read(&mut buf) => match read {
                    Ok(0) => {
                        debug!("Input closed");
                        self.decoder.flush(&mut self.events);
                        self.dispatch(&mut app)?.or(Some(ExitStatus::input_closed()))
                    }
                    Ok(n) => {
                        escape_deadline = None;
                        for &byte in &buf[..n] {
                            self.decoder.feed(byte, &mut self.events);
                        }
                        self.dispatch(&mut app)?
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => None,
                    Err(e) => return Err(BridgeError::InputFailure(e)),
                },

                () = tokio::time::sleep_until(flush_at), if pending => {
                    debug!("Escape timeout, flushing pending input");
                    self.decoder.flush(&mut self.events);
                    self.dispatch(&mut app)?
                }
            };

            if let Some(status) = status {
                return Ok(self.shutdown(status));
            }
        }
    }

    /// Hand decoded events to the application.
    fn dispatch<A: Application>(
        &mut self,
        app: &mut AppHandle<A>,
    ) -> Result<Option<ExitStatus>, BridgeError> {
        let mut raw = Vec::new();
        let mut keys = Vec::new();
        let mut interrupt = None;

        for event in self.events.drain(..) {
            match event {
                DecodedEvent::Raw(byte) => self.held.push_back(byte),
                DecodedEvent::Key(stroke) => {
                    if self.settings.interrupts.is_interrupt(&stroke) {
                        interrupt = Some(stroke.key);
                        break;
                    }
                    let width = usize::from(stroke.width).min(self.held.len());
                    raw.extend(self.held.drain(..width));
                    if self.settings.decode_keys {
                        keys.push(stroke.key);
                    }
                }
            }
        }
        if !self.decoder.is_enabled() {
            raw.extend(self.held.drain(..));
        }

        if !raw.is_empty() {
            app.send(Inbound::Raw(raw));
            if let Some(status) = self.pump(app)? {
                return Ok(Some(status));
            }
        }
        for key in keys {
            app.send(Inbound::Key(key));
            if let Some(status) = self.pump(app)? {
                return Ok(Some(status));
            }
        }

        if let Some(key) = interrupt {
            info!("Interrupt key {} observed", key);
        }
        Ok(interrupt.map(ExitStatus::interrupted))
    }

    /// Drain everything the application has queued so far.
    fn pump<A: Application>(
        &mut self,
        app: &mut AppHandle<A>,
    ) -> Result<Option<ExitStatus>, BridgeError> {
        while let Some(msg) = app.try_next() {
            if let Some(status) = self.deliver(msg)? {
                return Ok(Some(status));
            }
        }
        Ok(None)
    }

    fn deliver(&mut self, msg: Outbound) -> Result<Option<ExitStatus>, BridgeError> {
        match msg {
            Outbound::Write(bytes) => {
                self.writer.write(&bytes)?;
                Ok(None)
            }
            Outbound::Exit(code) => {
                info!("Application requested exit (code={:?})", code);
                Ok(Some(ExitStatus::requested(code)))
            }
        }
    }

    fn shutdown(&mut self, status: ExitStatus) -> ExitStatus {
        self.session.release();
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush output on exit: {}", e);
        }
        info!(
            "Bridge exiting with status {} ({}), {} bytes written",
            status.code,
            status.reason,
            self.writer.bytes_written()
        );
        status
    }
}
