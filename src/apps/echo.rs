use crate::core::app::{Application, Outbox};
use crate::core::message::{Flags, Inbound};

/// Echoes every raw input chunk back to the terminal, byte for byte.
pub struct EchoApp {
    outbox: Outbox,
}

impl EchoApp {
    pub fn new(_flags: Flags, outbox: Outbox) -> Self {
        Self { outbox }
    }
}

impl Application for EchoApp {
    fn update(&mut self, msg: Inbound) {
        if let Inbound::Raw(bytes) = msg {
            self.outbox.write(bytes);
        }
    }
}
