//! schoolgate - role-based school portal
//!
//! A console portal where students, teachers, heads of department and
//! administrators log in through a throttled session gate and reach the
//! dashboard for their role.

pub mod app;
pub mod auth;
pub mod config;
pub mod datetime;
pub mod directory;
pub mod error;
pub mod logging;
pub mod panel;
pub mod school;
pub mod server;

pub use app::{Application, ConsoleHandler, PanelCommand};
pub use auth::{
    hash_password, require_role, verify_password, AuthSession, GateSettings, LimitResult,
    LoginError, LoginLimiter, PasswordError, PermissionError, Session, SessionGate,
    SessionStatus, ThrottleScope,
};
pub use config::Config;
pub use directory::{CredentialRecord, MemoryDirectory, Role, UserDirectory};
pub use error::{Result, SchoolError};
pub use panel::{PanelRouter, RenderingRouter};
pub use school::SchoolData;
pub use server::ConsoleServer;
