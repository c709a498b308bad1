//! OS termination signals, forwarded into the bridge loop as messages.
//!
//! In raw mode Ctrl-C arrives as byte 0x03, not SIGINT, so these only fire
//! when the signal comes from outside (`kill`, terminal hangup).

use std::fmt;
use std::io;

use log::{info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
    Hangup,
}

impl TerminationSignal {
    pub fn number(self) -> i32 {
        match self {
            TerminationSignal::Hangup => 1,
            TerminationSignal::Interrupt => 2,
            TerminationSignal::Terminate => 15,
        }
    }

    /// Shell convention: 128 + signal number.
    pub fn exit_code(self) -> i32 {
        128 + self.number()
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Interrupt => f.write_str("SIGINT"),
            TerminationSignal::Terminate => f.write_str("SIGTERM"),
            TerminationSignal::Hangup => f.write_str("SIGHUP"),
        }
    }
}

/// Register signal listeners on the current runtime.
///
/// Must be called from inside a tokio runtime. Registration happens before
/// this returns, so a signal delivered afterwards is never missed.
#[cfg(unix)]
pub fn listen() -> io::Result<UnboundedReceiver<TerminationSignal>> {
    use tokio::signal::unix::{SignalKind, signal};

    let (tx, rx) = mpsc::unbounded_channel();
    for (kind, which) in [
        (SignalKind::interrupt(), TerminationSignal::Interrupt),
        (SignalKind::terminate(), TerminationSignal::Terminate),
        (SignalKind::hangup(), TerminationSignal::Hangup),
    ] {
        let mut stream = signal(kind)?;
        let tx = tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                forward(&tx, which);
            }
        });
    }
    info!("Signal handlers registered (SIGINT, SIGTERM, SIGHUP)");
    Ok(rx)
}

#[cfg(not(unix))]
pub fn listen() -> io::Result<UnboundedReceiver<TerminationSignal>> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            forward(&tx, TerminationSignal::Interrupt);
        }
    });
    info!("Signal handler registered (Ctrl-C)");
    Ok(rx)
}

fn forward(tx: &UnboundedSender<TerminationSignal>, signal: TerminationSignal) {
    info!("Received {}", signal);
    if tx.send(signal).is_err() {
        warn!("Failed to forward {}: bridge dropped the receiver", signal);
    }
}
