//! Console session handler.
//!
//! Drives one connection through the login form and the dashboard menu. The
//! handler owns the connection's `Session`; the gate it shares with every
//! other connection owns the throttle state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::command::{PanelCommand, HELP_TEXT};
use crate::auth::{Session, SessionGate, SessionStatus};
use crate::config::{Config, PortalConfig};
use crate::datetime::{format_datetime_default, format_duration};
use crate::directory::{Role, UserDirectory};
use crate::panel::{self, PanelRouter, RenderingRouter};
use crate::school::SchoolData;
use crate::server::telnet;
use crate::Result;

/// Message shown when a session outlives its lifetime.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please login again.";

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Longest accepted input line in bytes, terminator included.
pub const MAX_LINE_BYTES: usize = 1024;

/// One line read from the client.
enum Line {
    Complete(Vec<u8>),
    /// Longer than `MAX_LINE_BYTES`; the bytes were discarded.
    TooLong,
}

/// Read up to and including the next LF, keeping at most `limit` bytes.
/// `None` at end of input.
async fn read_capped_line<R>(reader: &mut R, limit: usize) -> std::io::Result<Option<Line>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let mut too_long = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(match (too_long, line.is_empty()) {
                (true, _) => Some(Line::TooLong),
                (false, true) => None,
                (false, false) => Some(Line::Complete(line)),
            });
        }

        let newline = available.iter().position(|&b| b == b'\n');
        let used = newline.map_or(available.len(), |i| i + 1);
        if !too_long {
            if line.len() + used > limit {
                too_long = true;
                line = Vec::new();
            } else {
                line.extend_from_slice(&available[..used]);
            }
        }
        reader.consume(used);

        if newline.is_some() {
            return Ok(Some(if too_long {
                Line::TooLong
            } else {
                Line::Complete(line)
            }));
        }
    }
}

/// Line-oriented connection with CRLF output and an idle timeout.
struct Connection<R, W> {
    reader: R,
    writer: W,
    idle_timeout: Duration,
}

impl<R, W> Connection<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn send(&mut self, data: &str) -> Result<()> {
        let data = data.replace("\r\n", "\n").replace('\n', "\r\n");
        self.send_raw(data.as_bytes()).await
    }

    async fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn send_line(&mut self, data: &str) -> Result<()> {
        self.send(data).await?;
        self.send("\n").await
    }

    /// Read one line without its terminator or Telnet commands. `None`
    /// means the client went away or stayed idle too long. An over-long
    /// line is reported to the client and read as empty.
    async fn read_line(&mut self) -> Result<Option<String>> {
        let read = read_capped_line(&mut self.reader, MAX_LINE_BYTES);
        match timeout(self.idle_timeout, read).await {
            Ok(Ok(None)) => Ok(None),
            Ok(Ok(Some(Line::Complete(bytes)))) => {
                let data = telnet::strip_commands(&bytes);
                let text = String::from_utf8_lossy(&data);
                Ok(Some(text.trim_end_matches(['\r', '\n', '\0']).to_string()))
            }
            Ok(Ok(Some(Line::TooLong))) => {
                warn!(limit = MAX_LINE_BYTES, "Discarded over-long input line");
                self.send_line(&format!(
                    "Error: Input too long (max {MAX_LINE_BYTES} characters)"
                ))
                .await?;
                Ok(Some(String::new()))
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                info!("Connection idle for {:?}, closing", self.idle_timeout);
                Ok(None)
            }
        }
    }

    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        self.send(label).await?;
        self.read_line().await
    }

    /// Prompt with client echo turned off for the answer.
    async fn prompt_hidden(&mut self, label: &str) -> Result<Option<String>> {
        self.send_raw(&telnet::suppress_echo()).await?;
        let answer = self.prompt(label).await;
        self.send_raw(&telnet::restore_echo()).await?;
        self.send("\n").await?;
        answer
    }
}

/// What the dashboard loop ended with.
enum Exit {
    /// Back to the login form.
    LoggedOut,
    /// Close the connection.
    Quit,
}

/// Credentials entered on the login form.
struct LoginForm {
    role: String,
    email: String,
    password: String,
}

/// Handler for a single console connection.
pub struct ConsoleHandler<D> {
    gate: Arc<SessionGate<D>>,
    router: RenderingRouter,
    portal: PortalConfig,
    timezone: String,
    idle_timeout: Duration,
    clock: Clock,
    session: Session,
}

impl<D: UserDirectory> ConsoleHandler<D> {
    pub fn new(gate: Arc<SessionGate<D>>, data: Arc<SchoolData>, config: &Config) -> Self {
        Self {
            gate,
            router: RenderingRouter::new(data),
            portal: config.portal.clone(),
            timezone: config.server.timezone.clone(),
            idle_timeout: Duration::from_secs(config.server.idle_timeout_secs),
            clock: Arc::new(Utc::now),
            session: Session::new(),
        }
    }

    /// Replace the clock used for logins and expiry checks.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Run the connection until the client quits or disconnects.
    pub async fn run<R, W>(&mut self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut conn = Connection {
            reader,
            writer,
            idle_timeout: self.idle_timeout,
        };

        let result = self.login_loop(&mut conn).await;
        // A dropped connection must not leave a live session behind.
        self.gate.logout(&mut self.session);
        result
    }

    async fn login_loop<R, W>(&mut self, conn: &mut Connection<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            conn.send_line("").await?;
            conn.send_line(&format!("=== {} ===", self.portal.name)).await?;
            conn.send_line(&self.portal.help_text).await?;
            conn.send_line("").await?;

            let Some(form) = self.read_login_form(conn).await? else {
                return Ok(());
            };

            let now = self.now();
            let outcome = self
                .gate
                .attempt_login_at(&mut self.session, &form.email, &form.password, &form.role, now)
                .map(|auth| auth.role);

            match outcome {
                Ok(role) => {
                    conn.send_line(&format!(
                        "Login successful. Welcome, {} ({})!",
                        form.email,
                        role.display_name()
                    ))
                    .await?;
                    match self.dashboard_loop(conn).await? {
                        Exit::LoggedOut => continue,
                        Exit::Quit => {
                            conn.send_line("Goodbye!").await?;
                            return Ok(());
                        }
                    }
                }
                Err(e) => conn.send_line(&format!("Error: {e}")).await?,
            }
        }
    }

    /// Prompt for role, email and password. `None` when the client quits.
    async fn read_login_form<R, W>(
        &mut self,
        conn: &mut Connection<R, W>,
    ) -> Result<Option<LoginForm>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let roles: Vec<_> = Role::ALL.iter().map(Role::display_name).collect();
        let label = format!("Role ({}) or Q to quit: ", roles.join("/"));

        let Some(role) = conn.prompt(&label).await? else {
            return Ok(None);
        };
        let role = role.trim().to_string();
        if role.eq_ignore_ascii_case("q") || role.eq_ignore_ascii_case("quit") {
            conn.send_line("Goodbye!").await?;
            return Ok(None);
        }

        let Some(email) = conn.prompt("Email: ").await? else {
            return Ok(None);
        };
        let Some(password) = conn.prompt_hidden("Password: ").await? else {
            return Ok(None);
        };

        Ok(Some(LoginForm {
            role,
            email: email.trim().to_string(),
            password,
        }))
    }

    async fn dashboard_loop<R, W>(&mut self, conn: &mut Connection<R, W>) -> Result<Exit>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.show_dashboard(conn).await?;

        loop {
            conn.send_line("").await?;
            let Some(input) = conn.prompt("Command (R/O <role>/L/Q, ? for help): ").await? else {
                return Ok(Exit::Quit);
            };
            let command = PanelCommand::parse(&input);

            let now = self.now();
            match self.gate.check_session_validity_at(&mut self.session, now) {
                SessionStatus::Valid => {}
                SessionStatus::Expired => {
                    conn.send_line(SESSION_EXPIRED_MESSAGE).await?;
                    return Ok(Exit::LoggedOut);
                }
                SessionStatus::Unauthenticated => return Ok(Exit::LoggedOut),
            }

            debug!(?command, "Dashboard command");
            match command {
                PanelCommand::Refresh => self.show_dashboard(conn).await?,
                PanelCommand::Open(role) => {
                    match panel::render(self.router.data(), &self.session, role) {
                        Ok(text) => conn.send_line(&text).await?,
                        Err(e) => conn.send_line(&format!("Error: {e}")).await?,
                    }
                }
                PanelCommand::Help => conn.send_line(HELP_TEXT).await?,
                PanelCommand::Logout => {
                    self.gate.logout(&mut self.session);
                    conn.send_line("You have been logged out.").await?;
                    return Ok(Exit::LoggedOut);
                }
                PanelCommand::Quit => {
                    self.gate.logout(&mut self.session);
                    return Ok(Exit::Quit);
                }
                PanelCommand::Invalid(input) => {
                    conn.send_line(&format!("Unknown command: {input}")).await?;
                }
            }
        }
    }

    /// Session header followed by the dashboard for the session's role.
    async fn show_dashboard<R, W>(&mut self, conn: &mut Connection<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Some(auth) = self.session.current() else {
            return Ok(());
        };
        let (role, user_id, email) = (auth.role, auth.user_id, auth.user_email.clone());
        let remaining = auth
            .remaining(self.gate.settings().session_lifetime(), self.now())
            .unwrap_or_else(chrono::Duration::zero);
        let header = format!(
            "Logged in as {email} ({})  since {}  session expires in {}",
            role.display_name(),
            format_datetime_default(&auth.login_time, &self.timezone),
            format_duration(remaining)
        );

        conn.send_line("").await?;
        conn.send_line(&header).await?;
        conn.send_line("").await?;

        match self.router.dispatch(role, user_id, &email) {
            Ok(()) => conn.send_line(&self.router.take_output()).await,
            Err(e) => {
                warn!(user_id, role = %role, error = %e, "Dashboard unavailable");
                conn.send_line(&format!("Error: {e}")).await
            }
        }
    }
}
