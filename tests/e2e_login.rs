//! E2E login tests for schoolgate.
//!
//! Drives the console over TCP through the login form, the throttle and the
//! dashboard menu.

mod common;

use std::io::Write;

use common::{
    test_config, LoginOutcome, TestServer, COMMAND_PROMPT_END, DEMO_PASSWORD, ROLE_PROMPT_END,
};

/// Each demo account reaches its own dashboard.
#[tokio::test]
async fn test_login_each_role() {
    let server = TestServer::new().await.unwrap();

    let cases = [
        ("Student", "student@test.com", "=== Student Dashboard ==="),
        ("Teacher", "teacher@test.com", "=== Teacher Dashboard ==="),
        ("HOD", "hod@test.com", "=== HOD Dashboard ==="),
        ("Admin", "admin@test.com", "=== Admin Dashboard ==="),
    ];

    for (role, email, title) in cases {
        let mut client = server.connect().await.unwrap();
        let outcome = client.login(role, email, DEMO_PASSWORD).await.unwrap();
        assert!(outcome.is_dashboard(), "{role}: {}", outcome.text());
        assert!(outcome.text().contains(title));
        assert!(outcome
            .text()
            .contains(&format!("Logged in as {email}")));
    }
}

/// Wrong password reports the remaining attempts.
#[tokio::test]
async fn test_wrong_password_counts_down() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();

    let outcome = client.login("Student", "student@test.com", "nope").await.unwrap();
    assert_eq!(
        outcome.text(),
        "Invalid credentials or unauthorized role access. Attempts remaining: 4"
    );

    let outcome = client.login("Student", "student@test.com", "nope").await.unwrap();
    assert_eq!(
        outcome.text(),
        "Invalid credentials or unauthorized role access. Attempts remaining: 3"
    );
}

/// Empty fields are rejected without touching the throttle.
#[tokio::test]
async fn test_missing_credentials() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();

    let outcome = client.login("Student", "", DEMO_PASSWORD).await.unwrap();
    assert_eq!(outcome.text(), "Please enter both email and password");

    let outcome = client.login("Student", "student@test.com", "nope").await.unwrap();
    assert!(outcome.text().ends_with("Attempts remaining: 4"));
}

/// An inactive account gets its own message and no throttle increment.
#[tokio::test]
async fn test_inactive_account() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();

    let outcome = client
        .login("Student", "inactive@test.com", DEMO_PASSWORD)
        .await
        .unwrap();
    assert_eq!(
        outcome.text(),
        "Account is inactive. Please contact administrator."
    );

    let outcome = client.login("Student", "student@test.com", "nope").await.unwrap();
    assert!(outcome.text().ends_with("Attempts remaining: 4"));
}

/// Correct password with the wrong role is rejected and counted.
#[tokio::test]
async fn test_role_mismatch() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();

    let outcome = client
        .login("Teacher", "admin@test.com", DEMO_PASSWORD)
        .await
        .unwrap();
    assert_eq!(
        outcome.text(),
        "Invalid credentials or unauthorized role access. Attempts remaining: 4"
    );
}

/// Five failures lock the gate; the correct password is then refused.
#[tokio::test]
async fn test_lockout_after_five_failures() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();

    for remaining in (0..5).rev() {
        let outcome = client.login("Student", "student@test.com", "nope").await.unwrap();
        assert!(
            outcome
                .text()
                .ends_with(&format!("Attempts remaining: {remaining}")),
            "{}",
            outcome.text()
        );
    }

    let outcome = client
        .login("Student", "student@test.com", DEMO_PASSWORD)
        .await
        .unwrap();
    assert!(matches!(outcome, LoginOutcome::Error(_)));
    assert_eq!(
        outcome.text(),
        "Too many failed attempts. Please try again in 15 minutes"
    );
}

/// With the default global scope a lockout applies to every connection.
#[tokio::test]
async fn test_global_lockout_spans_connections() {
    let server = TestServer::new().await.unwrap();

    let mut attacker = server.connect().await.unwrap();
    for _ in 0..5 {
        attacker
            .login("Student", "student@test.com", "nope")
            .await
            .unwrap();
    }

    let mut admin = server.connect().await.unwrap();
    let outcome = admin
        .login("Admin", "admin@test.com", DEMO_PASSWORD)
        .await
        .unwrap();
    assert!(outcome.text().starts_with("Too many failed attempts"));
}

/// Per-account scope only locks the account that failed.
#[tokio::test]
async fn test_per_account_lockout() {
    let mut config = test_config();
    config.auth.throttle_scope = "account".to_string();
    let server = TestServer::with_config(config).await.unwrap();

    let mut attacker = server.connect().await.unwrap();
    for _ in 0..5 {
        attacker
            .login("Student", "student@test.com", "nope")
            .await
            .unwrap();
    }
    let outcome = attacker
        .login("Student", "student@test.com", DEMO_PASSWORD)
        .await
        .unwrap();
    assert!(outcome.text().starts_with("Too many failed attempts"));

    let mut admin = server.connect().await.unwrap();
    let outcome = admin
        .login("Admin", "admin@test.com", DEMO_PASSWORD)
        .await
        .unwrap();
    assert!(outcome.is_dashboard());
}

/// Concurrent failures from separate connections are all counted.
#[tokio::test]
async fn test_concurrent_failures_are_counted() {
    let server = TestServer::new().await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let mut client = server.connect().await.unwrap();
        tasks.push(tokio::spawn(async move {
            client
                .login("Teacher", "teacher@test.com", "nope")
                .await
                .unwrap()
        }));
    }

    let mut remaining: Vec<String> = Vec::new();
    for task in tasks {
        remaining.push(task.await.unwrap().text().to_string());
    }
    remaining.sort();
    for (i, text) in remaining.iter().enumerate() {
        assert!(text.ends_with(&format!("Attempts remaining: {i}")), "{text}");
    }

    let mut client = server.connect().await.unwrap();
    let outcome = client
        .login("Teacher", "teacher@test.com", DEMO_PASSWORD)
        .await
        .unwrap();
    assert!(outcome.text().starts_with("Too many failed attempts"));
}

/// A successful login resets the counter.
#[tokio::test]
async fn test_success_resets_counter() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();

    for _ in 0..3 {
        client.login("HOD", "hod@test.com", "nope").await.unwrap();
    }
    assert!(client
        .login("HOD", "hod@test.com", DEMO_PASSWORD)
        .await
        .unwrap()
        .is_dashboard());
    client.logout().await.unwrap();

    let outcome = client.login("HOD", "hod@test.com", "nope").await.unwrap();
    assert!(outcome.text().ends_with("Attempts remaining: 4"));
}

/// Logout returns to the form and allows a new login.
#[tokio::test]
async fn test_logout_and_login_again() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();

    assert!(client
        .login("Student", "student@test.com", DEMO_PASSWORD)
        .await
        .unwrap()
        .is_dashboard());
    let response = client.logout().await.unwrap();
    assert!(response.contains("You have been logged out."));

    let outcome = client
        .login("Admin", "admin@test.com", DEMO_PASSWORD)
        .await
        .unwrap();
    assert!(outcome.text().contains("=== Admin Dashboard ==="));
}

/// Opening another role's dashboard is refused.
#[tokio::test]
async fn test_open_other_dashboard() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();
    client
        .login("Student", "student@test.com", DEMO_PASSWORD)
        .await
        .unwrap();

    let response = client.command("open admin").await.unwrap();
    assert!(response
        .contains("permission denied: the admin dashboard is not available to the student role"));

    let response = client.command("refresh").await.unwrap();
    assert!(response.contains("=== Student Dashboard ==="));

    let response = client.command("dance").await.unwrap();
    assert!(response.contains("Unknown command: dance"));
}

/// Quit says goodbye and closes the connection.
#[tokio::test]
async fn test_quit_closes_connection() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();
    client
        .login("Teacher", "teacher@test.com", DEMO_PASSWORD)
        .await
        .unwrap();

    client.send_line("q").await.unwrap();
    let rest = client.recv_to_end().await.unwrap();
    assert!(rest.contains("Goodbye!"));
}

/// Accounts from a users file can log in; without a school profile the
/// dashboard reports the missing record but the session stays usable.
#[tokio::test]
async fn test_users_file_account() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[[user]]
id = 10
email = "jane@school.edu"
role = "teacher"
password_hash = "{}"
"#,
        schoolgate::hash_password("s3cret")
    )
    .unwrap();

    let mut config = test_config();
    config.directory.seed_demo_users = false;
    config.directory.users_file = Some(file.path().to_string_lossy().to_string());
    let server = TestServer::with_config(config).await.unwrap();

    let mut client = server.connect().await.unwrap();
    let outcome = client
        .login("Student", "student@test.com", DEMO_PASSWORD)
        .await
        .unwrap();
    assert!(outcome.text().ends_with("Attempts remaining: 4"));

    let outcome = client
        .login("Teacher", "jane@school.edu", "s3cret")
        .await
        .unwrap();
    assert!(outcome.is_dashboard());
    assert!(outcome
        .text()
        .contains("Error: teacher profile for user 10 not found"));

    let response = client.command("help").await.unwrap();
    assert!(response.contains("[O]pen <role>"));
}

/// The password prompt asks a Telnet client to stop echoing and gives echo
/// back once the password is in.
#[tokio::test]
async fn test_password_prompt_negotiates_echo() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client.recv_until(ROLE_PROMPT_END).await.unwrap();
    client.send_line("Student").await.unwrap();
    client.recv_until("Email: ").await.unwrap();
    assert!(!client.raw().contains(&0xFF));
    client.send_line("student@test.com").await.unwrap();

    client.recv_until("Password: ").await.unwrap();
    assert!(client.raw().ends_with(b"\xff\xfb\x01Password: "));

    // A Telnet client acknowledges with IAC DO ECHO ahead of the password.
    client.send_bytes(&[0xFF, 0xFD, 0x01]).await.unwrap();
    client.send_line(DEMO_PASSWORD).await.unwrap();

    let text = client.recv_until(COMMAND_PROMPT_END).await.unwrap();
    assert!(client.raw().starts_with(&[0xFF, 0xFC, 0x01]));
    assert!(text.contains("Login successful. Welcome, student@test.com (Student)!"));
}

/// A huge input line is dropped instead of being buffered and echoed.
#[tokio::test]
async fn test_oversized_line_is_rejected() {
    let server = TestServer::new().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client.recv_until(ROLE_PROMPT_END).await.unwrap();
    client.send_bytes(&vec![b'x'; 8 * 1024 * 1024]).await.unwrap();
    client.send_line("").await.unwrap();

    let text = client.recv_until("Email: ").await.unwrap();
    assert!(text.contains("Error: Input too long"));
    client.send_line("student@test.com").await.unwrap();
    client.recv_until("Password: ").await.unwrap();
    client.send_line(DEMO_PASSWORD).await.unwrap();

    let (text, matched) = client
        .recv_until_any(&[COMMAND_PROMPT_END, ROLE_PROMPT_END])
        .await
        .unwrap();
    assert_eq!(matched, 1);
    assert!(text.contains("Error: Unknown role: \r\n"));
    assert!(text.len() < 4096);
}
