//! Test helpers for E2E tests.
//!
//! Provides TestClient and TestServer for driving the console over TCP.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use schoolgate::config::{Config, ServerConfig};
use schoolgate::{Application, ConsoleServer};

/// Default timeout for test operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Tail of the login form's role prompt.
pub const ROLE_PROMPT_END: &str = "or Q to quit: ";

/// Tail of the dashboard command prompt.
pub const COMMAND_PROMPT_END: &str = "? for help): ";

/// Password of the demo accounts.
pub const DEMO_PASSWORD: &str = "test123";

/// Outcome of a login attempt through the console.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Logged in; holds everything up to the command prompt.
    Dashboard(String),
    /// Rejected; holds the error line.
    Error(String),
}

impl LoginOutcome {
    pub fn is_dashboard(&self) -> bool {
        matches!(self, LoginOutcome::Dashboard(_))
    }

    pub fn text(&self) -> &str {
        match self {
            LoginOutcome::Dashboard(text) | LoginOutcome::Error(text) => text,
        }
    }
}

/// Test client for connecting to the console server.
pub struct TestClient {
    stream: TcpStream,
    buffer: Vec<u8>,
}

impl TestClient {
    /// Connect to the server at the given address.
    pub async fn connect(addr: SocketAddr) -> Result<Self, std::io::Error> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            stream,
            buffer: Vec::with_capacity(4096),
        })
    }

    /// Send a line (with LF) to the server.
    pub async fn send_line(&mut self, line: &str) -> Result<(), std::io::Error> {
        self.send_bytes(line.as_bytes()).await?;
        self.send_bytes(b"\n").await
    }

    /// Send raw bytes to the server.
    pub async fn send_bytes(&mut self, data: &[u8]) -> Result<(), std::io::Error> {
        self.stream.write_all(data).await?;
        self.stream.flush().await
    }

    /// Receive data until one of the patterns is found.
    ///
    /// Returns the received text and the index of the matched pattern.
    pub async fn recv_until_any(
        &mut self,
        patterns: &[&str],
    ) -> Result<(String, usize), std::io::Error> {
        self.buffer.clear();
        let mut buf = [0u8; 1];

        let result = timeout(DEFAULT_TIMEOUT, async {
            loop {
                match self.stream.read(&mut buf).await {
                    Ok(0) => {
                        return Err(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            format!("connection closed; received: {}", self.decode_buffer()),
                        ))
                    }
                    Ok(_) => {
                        self.buffer.push(buf[0]);
                        let decoded = self.decode_buffer();
                        if let Some(i) = patterns.iter().position(|p| decoded.ends_with(p)) {
                            return Ok((decoded, i));
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
        })
        .await;

        match result {
            Ok(r) => r,
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!(
                    "Timeout waiting for {:?}; received: {}",
                    patterns,
                    self.decode_buffer()
                ),
            )),
        }
    }

    /// Receive data until a pattern is found.
    pub async fn recv_until(&mut self, pattern: &str) -> Result<String, std::io::Error> {
        self.recv_until_any(&[pattern]).await.map(|(text, _)| text)
    }

    /// Read until the server closes the connection.
    pub async fn recv_to_end(&mut self) -> Result<String, std::io::Error> {
        let mut rest = Vec::new();
        timeout(DEFAULT_TIMEOUT, self.stream.read_to_end(&mut rest))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "still open"))??;
        Ok(String::from_utf8_lossy(&rest).to_string())
    }

    /// Raw bytes of the last `recv_until` call.
    pub fn raw(&self) -> &[u8] {
        &self.buffer
    }

    fn decode_buffer(&self) -> String {
        // Drop Telnet command bytes; the option byte that follows is a
        // control character and never part of a pattern.
        let filtered: Vec<u8> = self.buffer.iter().copied().filter(|&b| b < 0xF0).collect();
        String::from_utf8_lossy(&filtered).to_string()
    }

    /// Fill in the login form.
    ///
    /// Expects the role prompt to be next in the stream and leaves the
    /// stream either at the command prompt or just after the error line.
    pub async fn login(
        &mut self,
        role: &str,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, std::io::Error> {
        self.recv_until(ROLE_PROMPT_END).await?;
        self.send_line(role).await?;
        self.recv_until("Email: ").await?;
        self.send_line(email).await?;
        self.recv_until("Password: ").await?;
        self.send_line(password).await?;

        let (text, matched) = self
            .recv_until_any(&[COMMAND_PROMPT_END, "Error: "])
            .await?;
        if matched == 0 {
            return Ok(LoginOutcome::Dashboard(text));
        }
        let line = self.recv_until("\r\n").await?;
        Ok(LoginOutcome::Error(line.trim_end().to_string()))
    }

    /// Send a dashboard command and read up to the next command prompt.
    pub async fn command(&mut self, command: &str) -> Result<String, std::io::Error> {
        self.send_line(command).await?;
        self.recv_until(COMMAND_PROMPT_END).await
    }

    /// Log out, leaving the login form's role prompt next in the stream.
    pub async fn logout(&mut self) -> Result<String, std::io::Error> {
        self.send_line("logout").await?;
        self.recv_until("You have been logged out.\r\n").await
    }
}

/// Console server running on a random local port.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with the default configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_config(test_config()).await
    }

    /// Start a server with a custom configuration. Host and port are
    /// replaced with a local ephemeral address.
    pub async fn with_config(mut config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        config.server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..config.server
        };

        let server = ConsoleServer::bind(&config.server).await?;
        let addr = server.local_addr()?;
        let app = Application::from_config(config)?;

        let handle = tokio::spawn(async move {
            let _ = server.serve(app).await;
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Connect a new client.
    pub async fn connect(&self) -> Result<TestClient, std::io::Error> {
        TestClient::connect(self.addr).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Default test configuration.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.logging.file = String::new();
    config.server.idle_timeout_secs = 30;
    config
}
