//! Dashboard menu commands.

use crate::directory::Role;

/// Command typed at the dashboard prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    /// Redraw the dashboard.
    Refresh,
    /// Open the dashboard of a specific role.
    Open(Role),
    /// Show the command list.
    Help,
    /// Log out and return to the login form.
    Logout,
    /// Disconnect.
    Quit,
    /// Anything else.
    Invalid(String),
}

impl PanelCommand {
    /// Parse a command (case-insensitive).
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_lowercase();
        let (word, arg) = match input.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (input.as_str(), ""),
        };

        match (word, arg) {
            ("r" | "refresh", "") => PanelCommand::Refresh,
            ("o" | "open", role) if !role.is_empty() => match role.parse() {
                Ok(role) => PanelCommand::Open(role),
                Err(_) => PanelCommand::Invalid(input.clone()),
            },
            ("h" | "?" | "help", "") => PanelCommand::Help,
            ("l" | "logout", "") => PanelCommand::Logout,
            ("q" | "quit", "") => PanelCommand::Quit,
            _ => PanelCommand::Invalid(input.clone()),
        }
    }
}

/// Command list shown by `help`.
pub const HELP_TEXT: &str = "\
Commands:
  [R]efresh       redraw your dashboard
  [O]pen <role>   open a role dashboard (student, teacher, hod, admin)
  [L]ogout        log out and return to the login form
  [Q]uit          disconnect";
