//! Console server module.
//!
//! A line-oriented TCP service: each connection walks the login form and
//! then the dashboard menu of its role. Telnet clients get ECHO negotiated
//! off while a password is typed.

mod listener;
pub(crate) mod telnet;

pub use listener::ConsoleServer;
