//! # Core Contract
//!
//! The message interface between the terminal side and a hosted application.
//! Nothing in here touches the terminal device.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      APPLICATION        │
//!                    │  (external, opaque)     │
//!                    └─────▲─────────────┬─────┘
//!                  Inbound │             │ Outbound
//!              Raw / Key   │             │ Write / Exit
//!                    ┌─────┴─────────────▼─────┐
//!                    │         BRIDGE          │
//!                    └─────▲─────────────┬─────┘
//!                          │             │
//!                   InputDecoder    OutputWriter
//!                          │             │
//!                        stdin         stdout
//! ```
//!
//! ## Modules
//!
//! - [`message`]: `Inbound`, `Outbound` and the `Flags` init value
//! - [`app`]: the `Application` trait plus the `AppHandle` / `Outbox` channel pair
//! - [`policy`]: who owns the interrupt keys
//! - [`error`]: fatal bridge errors
//! - [`config`]: layered settings

pub mod app;
pub mod config;
pub mod error;
pub mod message;
pub mod policy;

pub use app::{AppHandle, Application, Outbox};
pub use error::BridgeError;
pub use message::{Flags, Inbound, Outbound};
pub use policy::InterruptPolicy;
