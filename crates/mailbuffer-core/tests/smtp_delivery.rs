//! End-to-end flushes through the SMTP transport.
//!
//! A scripted server on a loopback socket plays the mail relay so the whole
//! path from buffered entries to the DATA payload is exercised.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use mailbuffer_core::{
    BufferingMailer, EmailSettings, FlushStatus, Level, LogEntry, MailerConfig, StateStore,
};

enum Step {
    Expect(&'static str, &'static str),
    Data(&'static str),
}

async fn relay(script: Vec<Step>) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let mut received = Vec::new();

        write_half.write_all(b"220 relay.test ESMTP\r\n").await.unwrap();
        for step in script {
            match step {
                Step::Expect(prefix, reply) => {
                    let line = lines.next_line().await.unwrap().unwrap();
                    assert!(line.starts_with(prefix), "expected {prefix:?}, got {line:?}");
                    received.push(line);
                    write_half.write_all(reply.as_bytes()).await.unwrap();
                }
                Step::Data(reply) => {
                    loop {
                        let line = lines.next_line().await.unwrap().unwrap();
                        let done = line == ".";
                        received.push(line);
                        if done {
                            break;
                        }
                    }
                    write_half.write_all(reply.as_bytes()).await.unwrap();
                }
            }
        }
        received
    });

    (port, handle)
}

fn config(dir: &Path, port: u16) -> MailerConfig {
    let mut email = EmailSettings::new(
        "alerts@example.com",
        vec!["ops@example.com".to_string()],
        "Error Alert",
        "127.0.0.1",
    );
    email.port = port;
    MailerConfig::new(email, dir.join("state.json"), dir.join("app.log"))
}

fn entry(message: &str) -> LogEntry {
    LogEntry::new("worker", Level::Error, message, "/srv/worker.py", 10).with_function("run")
}

#[tokio::test]
async fn test_forced_flush_delivers_over_smtp() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.log"), "full log\n").unwrap();
    let (port, server) = relay(vec![
        Step::Expect("EHLO localhost", "250-relay.test\r\n250 8BITMIME\r\n"),
        Step::Expect("MAIL FROM:<alerts@example.com>", "250 OK\r\n"),
        Step::Expect("RCPT TO:<ops@example.com>", "250 OK\r\n"),
        Step::Expect("DATA", "354 Go ahead\r\n"),
        Step::Data("250 Queued\r\n"),
        Step::Expect("QUIT", "221 Bye\r\n"),
    ])
    .await;

    let mut mailer = BufferingMailer::with_smtp(config(dir.path(), port)).unwrap();
    mailer.append(entry("queue stalled"));
    mailer.append(entry("queue still stalled"));

    let outcome = mailer.flush(true, &[]).await.unwrap();

    assert_eq!(outcome.status, FlushStatus::Succeeded);
    assert!(mailer.is_empty());
    assert!(
        StateStore::load(dir.path().join("state.json"))
            .unwrap()
            .buffer
            .is_empty()
    );

    let received = server.await.unwrap();
    assert!(received.contains(&"Subject: Error Alert".to_string()));
    assert!(received.iter().any(|l| l.starts_with("Content-Type: multipart/mixed")));
    assert!(received.contains(&"Content-Disposition: attachment; filename=\"app.log\"".to_string()));
}

#[tokio::test]
async fn test_rejected_sender_keeps_entries_and_still_quits() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.log"), "full log\n").unwrap();
    let (port, server) = relay(vec![
        Step::Expect("EHLO", "250 relay.test\r\n"),
        Step::Expect("MAIL FROM:", "451 Try again later\r\n"),
        Step::Expect("QUIT", "221 Bye\r\n"),
    ])
    .await;

    let mut mailer = BufferingMailer::with_smtp(config(dir.path(), port)).unwrap();
    mailer.append(entry("queue stalled"));

    let outcome = mailer.flush(true, &[]).await.unwrap();

    assert_eq!(outcome.status, FlushStatus::Failed);
    assert!(outcome.detail.contains("451"));
    assert_eq!(mailer.len(), 1);
    assert_eq!(
        StateStore::load(dir.path().join("state.json"))
            .unwrap()
            .buffer
            .len(),
        1
    );

    let received = server.await.unwrap();
    assert_eq!(received.last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn test_unreachable_server_is_a_failed_outcome() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.log"), "full log\n").unwrap();
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut mailer = BufferingMailer::with_smtp(config(dir.path(), port)).unwrap();
    mailer.append(entry("queue stalled"));

    let outcome = mailer.flush(true, &[]).await.unwrap();

    assert_eq!(outcome.status, FlushStatus::Failed);
    assert_eq!(mailer.len(), 1);
}
