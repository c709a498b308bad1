//! # Application Ports
//!
//! A hosted application sees exactly two things: `update()` calls carrying
//! `Inbound` messages, and an `Outbox` it can push `Outbound` messages into.
//! The outbox is a channel, so an application may also hand clones of it to
//! tasks it spawns and emit output later.
//!
//! ```text
//! AppHandle
//! ├── app: A                               // the application instance
//! └── outbound: UnboundedReceiver<Outbound> // drained by the bridge
//! ```

use log::warn;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::message::{Flags, Inbound, Outbound};

/// An application hosted behind the bridge.
pub trait Application {
    /// Handle one inbound message. Output goes through the `Outbox` the
    /// application was constructed with.
    fn update(&mut self, msg: Inbound);
}

/// Sending half of the application's outbound channel.
#[derive(Clone, Debug)]
pub struct Outbox {
    tx: UnboundedSender<Outbound>,
}

impl Outbox {
    pub fn send(&self, msg: Outbound) {
        if self.tx.send(msg).is_err() {
            warn!("Failed to send outbound message: bridge dropped the receiver");
        }
    }

    /// Write bytes or text to the terminal.
    pub fn write(&self, data: impl Into<Vec<u8>>) {
        self.send(Outbound::Write(data.into()));
    }

    /// Ask the bridge to terminate the process.
    pub fn exit(&self, code: Option<i32>) {
        self.send(Outbound::Exit(code));
    }
}

/// The running application plus the receiving end of its outbound channel.
///
/// Created exactly once per bridge run, never recreated.
pub struct AppHandle<A> {
    app: A,
    outbound: UnboundedReceiver<Outbound>,
}

impl<A: Application> AppHandle<A> {
    /// Construct the application with its init value and a fresh outbox.
    pub fn start(init: impl FnOnce(Flags, Outbox) -> A, flags: Flags) -> Self {
        let (tx, outbound) = mpsc::unbounded_channel();
        let app = init(flags, Outbox { tx });
        Self { app, outbound }
    }

    pub fn send(&mut self, msg: Inbound) {
        self.app.update(msg);
    }

    /// Next queued outbound message, without waiting.
    pub fn try_next(&mut self) -> Option<Outbound> {
        self.outbound.try_recv().ok()
    }

    /// Wait for the next outbound message. Cancel safe.
    pub async fn next(&mut self) -> Option<Outbound> {
        self.outbound.recv().await
    }
}
