//! Integration tests for the SMTP session.
//!
//! These tests run a scripted SMTP server on a loopback socket and check
//! both what the client sends and how it interprets the replies.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use mailbuffer_smtp::{Address, Error, ReplyClass, Session};

/// One exchange in the server script.
enum Step {
    /// Expect a command line starting with the prefix, then reply.
    Expect(&'static str, &'static str),
    /// Read message data up to the lone `.` line, then reply.
    Data(&'static str),
}

/// Starts a one-connection server and returns its port plus a handle that
/// resolves to every line the client sent.
async fn scripted_server(greeting: &'static str, script: Vec<Step>) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let mut received = Vec::new();

        write_half.write_all(greeting.as_bytes()).await.unwrap();

        for step in script {
            match step {
                Step::Expect(prefix, response) => {
                    let line = lines.next_line().await.unwrap().unwrap();
                    assert!(line.starts_with(prefix), "expected {prefix:?}, got {line:?}");
                    received.push(line);
                    write_half.write_all(response.as_bytes()).await.unwrap();
                }
                Step::Data(response) => {
                    loop {
                        let line = lines.next_line().await.unwrap().unwrap();
                        let done = line == ".";
                        received.push(line);
                        if done {
                            break;
                        }
                    }
                    write_half.write_all(response.as_bytes()).await.unwrap();
                }
            }
        }
        received
    });

    (port, handle)
}

fn addr(s: &str) -> Address {
    Address::new(s).unwrap()
}

fn is_permanent(err: &Error) -> bool {
    matches!(err, Error::SmtpError { code, .. } if code.class() == ReplyClass::PermanentFailure)
}

#[tokio::test]
async fn test_delivers_message_and_reports_refused_recipient() {
    let (port, server) = scripted_server(
        "220 mock.example.com ESMTP ready\r\n",
        vec![
            Step::Expect(
                "EHLO client.test",
                "250-mock.example.com\r\n250-SIZE 1000000\r\n250 8BITMIME\r\n",
            ),
            Step::Expect("MAIL FROM:<alerts@example.com> SIZE=", "250 OK\r\n"),
            Step::Expect("RCPT TO:<ops@example.com>", "250 OK\r\n"),
            Step::Expect("RCPT TO:<gone@example.com>", "550 No such user\r\n"),
            Step::Expect("DATA", "354 End data with <CR><LF>.<CR><LF>\r\n"),
            Step::Data("250 Queued\r\n"),
            Step::Expect("QUIT", "221 Bye\r\n"),
        ],
    )
    .await;

    let mut session = Session::connect("127.0.0.1", port, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(session.server_info().hostname, "mock.example.com");

    session.ehlo("client.test").await.unwrap();
    assert_eq!(session.server_info().max_message_size(), Some(1_000_000));

    let refused = session
        .send_mail(
            &addr("alerts@example.com"),
            &[addr("ops@example.com"), addr("gone@example.com")],
            b"Subject: alert\r\n\r\n.starts with dot\r\nend\r\n",
        )
        .await
        .unwrap();
    assert_eq!(refused, vec![addr("gone@example.com")]);

    session.quit().await.unwrap();

    let received = server.await.unwrap();
    assert!(received.contains(&"..starts with dot".to_string()));
    assert!(received.contains(&"Subject: alert".to_string()));
}

#[tokio::test]
async fn test_falls_back_to_auth_login() {
    let (port, server) = scripted_server(
        "220 mock ready\r\n",
        vec![
            Step::Expect("EHLO", "250-mock\r\n250 AUTH LOGIN\r\n"),
            Step::Expect("AUTH LOGIN", "334 VXNlcm5hbWU6\r\n"),
            Step::Expect("dXNlcg==", "334 UGFzc3dvcmQ6\r\n"),
            Step::Expect("c2VjcmV0", "235 Authenticated\r\n"),
            Step::Expect("QUIT", "221 Bye\r\n"),
        ],
    )
    .await;

    let mut session = Session::connect("127.0.0.1", port, Duration::from_secs(5))
        .await
        .unwrap();
    session.ehlo("client.test").await.unwrap();
    session.login("user", "secret").await.unwrap();
    session.quit().await.unwrap();

    server.await.unwrap();
}

#[tokio::test]
async fn test_rejected_credentials_are_smtp_errors() {
    let (port, _server) = scripted_server(
        "220 mock ready\r\n",
        vec![
            Step::Expect("EHLO", "250-mock\r\n250 AUTH PLAIN LOGIN\r\n"),
            Step::Expect("AUTH PLAIN ", "535 Authentication failed\r\n"),
        ],
    )
    .await;

    let mut session = Session::connect("127.0.0.1", port, Duration::from_secs(5))
        .await
        .unwrap();
    session.ehlo("client.test").await.unwrap();

    let err = session.login("user", "wrong").await.unwrap_err();
    assert!(is_permanent(&err));
}

#[tokio::test]
async fn test_starttls_requires_advertisement() {
    let (port, _server) = scripted_server(
        "220 mock ready\r\n",
        vec![Step::Expect("EHLO", "250 mock\r\n")],
    )
    .await;

    let mut session = Session::connect("127.0.0.1", port, Duration::from_secs(5))
        .await
        .unwrap();
    session.ehlo("client.test").await.unwrap();

    let err = session.starttls().await.unwrap_err();
    assert!(matches!(err, Error::NotSupported(_)));
}

#[tokio::test]
async fn test_all_recipients_refused_fails_transaction() {
    let (port, _server) = scripted_server(
        "220 mock ready\r\n",
        vec![
            Step::Expect("EHLO", "250 mock\r\n"),
            Step::Expect("MAIL FROM:<alerts@example.com>", "250 OK\r\n"),
            Step::Expect("RCPT TO:<ops@example.com>", "550 No such user\r\n"),
        ],
    )
    .await;

    let mut session = Session::connect("127.0.0.1", port, Duration::from_secs(5))
        .await
        .unwrap();
    session.ehlo("client.test").await.unwrap();

    let err = session
        .send_mail(&addr("alerts@example.com"), &[addr("ops@example.com")], b"x")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RecipientsRefused(_)));
}

#[tokio::test]
async fn test_unfriendly_greeting_is_rejected() {
    let (port, _server) = scripted_server("554 go away\r\n", vec![]).await;

    let err = Session::connect("127.0.0.1", port, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(is_permanent(&err));
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let _server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let err = Session::connect("127.0.0.1", port, Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
}
