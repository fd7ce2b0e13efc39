//! Browser session management
//!
//! Launches or connects to Chrome through the DevTools protocol and turns a
//! URL into a rendered [`DomTree`](crate::dom::DomTree) snapshot.

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;
