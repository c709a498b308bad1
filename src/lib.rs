//! Termbridge library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::policy::InterruptPolicy;

pub mod apps;
pub mod bridge;
pub mod core;
pub mod terminal;

#[cfg(test)]
pub mod test_support;

/// Bundled application the binary hosts behind the bridge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    #[default]
    Echo,
    Keys,
}

impl AppKind {
    /// Interrupt policy used when no config layer sets one. The key viewer
    /// reads Escape and Ctrl-C itself.
    pub fn default_interrupts(self) -> InterruptPolicy {
        match self {
            AppKind::Echo => InterruptPolicy::Bridge,
            AppKind::Keys => InterruptPolicy::Application,
        }
    }
}
