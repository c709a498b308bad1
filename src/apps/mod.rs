//! # Bundled Applications
//!
//! Small applications the binary can host. Real deployments plug their own
//! `Application` into the bridge; these exist to exercise both interrupt
//! policies from the command line.
//!
//! - [`echo`]: writes raw input straight back (bridge owns Escape / Ctrl-C)
//! - [`keys`]: prints decoded keys and exits on its own terms

pub mod echo;
pub mod keys;

pub use echo::EchoApp;
pub use keys::KeyViewerApp;
