//! Role dashboards.
//!
//! After a successful login the console hands the session's role to a
//! [`PanelRouter`], which picks the dashboard for that role. Each dashboard
//! is rendered as plain text from [`SchoolData`].

mod admin;
mod hod;
mod student;
mod teacher;

use std::sync::Arc;

use tracing::debug;

use crate::auth::{require_role, Session};
use crate::directory::Role;
use crate::school::SchoolData;
use crate::Result;

/// Receives control after a successful login.
pub trait PanelRouter {
    /// Show the dashboard for `role`.
    fn dispatch(&mut self, role: Role, user_id: i64, email: &str) -> Result<()>;
}

/// Router that renders dashboards into a text buffer.
#[derive(Debug, Clone)]
pub struct RenderingRouter {
    data: Arc<SchoolData>,
    output: String,
}

impl RenderingRouter {
    pub fn new(data: Arc<SchoolData>) -> Self {
        Self {
            data,
            output: String::new(),
        }
    }

    pub fn data(&self) -> &SchoolData {
        &self.data
    }

    /// Take the rendered text, leaving the buffer empty.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl PanelRouter for RenderingRouter {
    fn dispatch(&mut self, role: Role, user_id: i64, email: &str) -> Result<()> {
        debug!(role = %role, user_id, "Rendering dashboard");
        let text = render_role(&self.data, role, user_id, email)?;
        self.output.push_str(&text);
        Ok(())
    }
}

/// Render the dashboard for `role` without any session check.
pub fn render_role(data: &SchoolData, role: Role, user_id: i64, email: &str) -> Result<String> {
    match role {
        Role::Student => student::render(data, user_id, email),
        Role::Teacher => teacher::render(data, user_id, email),
        Role::Hod => hod::render(data, user_id, email),
        Role::Admin => admin::render(data, user_id, email),
    }
}

/// Render the `panel` dashboard for the logged-in user.
///
/// Fails with a permission error unless the session holds exactly that role.
pub fn render(data: &SchoolData, session: &Session, panel: Role) -> Result<String> {
    let auth = require_role(session, panel)?;
    render_role(data, panel, auth.user_id, &auth.user_email)
}

/// Section heading used by all dashboards.
fn heading(title: &str) -> String {
    format!("--- {title} ---")
}
