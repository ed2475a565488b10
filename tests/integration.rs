//! End-to-end integration tests for the table test runner
//!
//! These tests run real test and suite documents against an in-process
//! mock of the remote command server: a minimal HTTP responder with
//! scripted per-command replies and a log of everything that reached the
//! wire.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use tabletest::report;
use tabletest::runner::{SuiteRunner, TestRunner, TestState};
use tabletest::RunConfig;

/// Canned reply per command name; unscripted commands answer "OK"
/// (session commands have built-in defaults)
type Script = HashMap<String, String>;

/// Everything that reached the wire, in order: (command, numbered args)
type CommandLog = Arc<Mutex<Vec<(String, Vec<String>)>>>;

async fn spawn_server(script: Script) -> (SocketAddr, CommandLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: CommandLog = Arc::default();
    let script = Arc::new(script);

    let accept_log = log.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let script = script.clone();
            let log = accept_log.clone();
            tokio::spawn(async move {
                let _ = serve(stream, script, log).await;
            });
        }
    });

    (addr, log)
}

async fn serve(stream: TcpStream, script: Arc<Script>, log: CommandLog) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    loop {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await? == 0 {
            return Ok(());
        }

        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).await? == 0 {
                return Ok(());
            }
            if header == "\r\n" || header == "\n" {
                break;
            }
            let lower = header.to_ascii_lowercase();
            if let Some(value) = lower.strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).await?;
        let pairs = parse_form(&String::from_utf8_lossy(&body));

        let cmd = pairs
            .iter()
            .find(|(key, _)| key == "cmd")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        let mut numbered: Vec<(usize, String)> = pairs
            .iter()
            .filter_map(|(key, value)| key.parse::<usize>().ok().map(|n| (n, value.clone())))
            .collect();
        numbered.sort_by_key(|(n, _)| *n);
        let args: Vec<String> = numbered.into_iter().map(|(_, value)| value).collect();

        log.lock().unwrap().push((cmd.clone(), args));

        let reply = script.get(cmd.as_str()).cloned().unwrap_or_else(|| {
            match cmd.as_str() {
                "getNewBrowserSession" => "OK,MOCKSESSION".to_string(),
                _ => "OK".to_string(),
            }
        });

        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: {}\r\n\r\n{}",
            reply.len(),
            reply
        );
        write_half.write_all(response.as_bytes()).await?;
        write_half.flush().await?;
    }
}

fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (url_decode(key), url_decode(value))
        })
        .collect()
}

fn url_decode(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                match decoded {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(bytes[i]);
                        i += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn config(addr: SocketAddr) -> RunConfig {
    RunConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        browser: "*mock".to_string(),
        base_url: Some("http://app.example/".to_string()),
        verbose: false,
    }
}

fn write_doc(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn test_doc(title: &str, rows: &[&[&str]]) -> String {
    let mut body = String::from("<html><body><table>\n");
    body.push_str(&format!("<tr><td colspan=\"3\">{title}</td></tr>\n"));
    for row in rows {
        body.push_str("<tr>");
        for cell in *row {
            body.push_str(&format!("<td>{cell}</td>"));
        }
        body.push_str("</tr>\n");
    }
    body.push_str("</table></body></html>\n");
    body
}

fn wire_commands(log: &CommandLog) -> Vec<String> {
    log.lock().unwrap().iter().map(|(cmd, _)| cmd.clone()).collect()
}

#[tokio::test]
async fn verify_error_marks_test_failed_but_continues() {
    let (addr, log) = spawn_server(HashMap::from([(
        "verifyTitle".to_string(),
        "ERROR: title mismatch".to_string(),
    )]))
    .await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(
        dir.path(),
        "login.html",
        &test_doc(
            "Login Test",
            &[
                &["open", "/login", ""],
                &["verifyTitle", "Login Page", ""],
                &["echo", "done", ""],
            ],
        ),
    );

    let cfg = config(addr);
    let test = TestRunner::new(&cfg).run(&path, None).await.unwrap();

    assert_eq!(test.name, "Login Test");
    assert_eq!(test.state, TestState::Failed);
    assert_eq!(test.commands.len(), 3, "execution continues past verify errors");
    assert!(test.commands[1].error);
    assert!(!test.commands[1].failure);
    assert_eq!(test.commands[2].result, "OK,done");

    let commands = wire_commands(&log);
    assert_eq!(commands.first().map(String::as_str), Some("getNewBrowserSession"));
    assert_eq!(commands.last().map(String::as_str), Some("testComplete"));

    let html = report::render(&report::from_test(&test, &cfg));
    assert!(html.contains("FAILED"));
    assert!(html.contains("class=\"failed\""));
    assert!(html.contains("ERROR: title mismatch"));
}

#[tokio::test]
async fn hard_failure_aborts_remaining_commands() {
    let (addr, log) = spawn_server(HashMap::from([(
        "open".to_string(),
        "ERROR: could not open".to_string(),
    )]))
    .await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(
        dir.path(),
        "login.html",
        &test_doc(
            "Login Test",
            &[
                &["open", "/login", ""],
                &["verifyTitle", "Login Page", ""],
            ],
        ),
    );

    let cfg = config(addr);
    let test = TestRunner::new(&cfg).run(&path, None).await.unwrap();

    assert_eq!(test.state, TestState::Failed);
    assert_eq!(test.commands.len(), 1, "rows after a hard failure are not executed");
    assert!(test.commands[0].failure);

    // The session is still released exactly once
    let commands = wire_commands(&log);
    assert_eq!(
        commands.iter().filter(|c| c.as_str() == "testComplete").count(),
        1
    );
    assert!(!commands.iter().any(|c| c == "verifyTitle"));
}

#[tokio::test]
async fn local_commands_never_reach_the_wire() {
    let (addr, log) = spawn_server(Script::new()).await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(
        dir.path(),
        "local.html",
        &test_doc(
            "Local Commands",
            &[
                &["echo", "hi", ""],
                &["pause", "1", ""],
                &["a comment row"],
            ],
        ),
    );

    let cfg = config(addr);
    let test = TestRunner::new(&cfg).run(&path, None).await.unwrap();

    assert_eq!(test.state, TestState::Passed);
    assert_eq!(test.commands[0].result, "OK,hi");
    assert_eq!(test.commands[1].result, "OK");
    assert_eq!(test.commands[2].result, "OK");
    assert!(test.commands[2].args.is_none());

    let commands = wire_commands(&log);
    assert_eq!(commands, vec!["getNewBrowserSession", "testComplete"]);
}

#[tokio::test]
async fn expected_error_inverts_to_success() {
    let (addr, _log) = spawn_server(HashMap::from([(
        "click".to_string(),
        "ERROR: no such element".to_string(),
    )]))
    .await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(
        dir.path(),
        "toggle.html",
        &test_doc(
            "Toggle Test",
            &[
                &["assertErrorOnNext", "no such element", ""],
                &["click", "id=missing", ""],
            ],
        ),
    );

    let cfg = config(addr);
    let test = TestRunner::new(&cfg).run(&path, None).await.unwrap();

    assert_eq!(test.state, TestState::Passed);
    assert_eq!(test.commands[1].result, "OK");
    assert!(!test.commands[1].error);
}

#[tokio::test]
async fn unexpected_success_becomes_error() {
    let (addr, _log) = spawn_server(Script::new()).await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(
        dir.path(),
        "toggle.html",
        &test_doc(
            "Toggle Test",
            &[
                &["assertErrorOnNext", "should fail", ""],
                &["click", "id=present", ""],
            ],
        ),
    );

    let cfg = config(addr);
    let test = TestRunner::new(&cfg).run(&path, None).await.unwrap();

    assert_eq!(test.state, TestState::Failed);
    assert!(test.commands[1].error);
    assert_eq!(test.commands[1].result, "ERROR: Error expected");
}

#[tokio::test]
async fn suite_runs_every_test_and_aggregates_verdicts() {
    let (addr, log) = spawn_server(HashMap::from([(
        "clickBroken".to_string(),
        "ERROR: boom".to_string(),
    )]))
    .await;
    let dir = tempfile::tempdir().unwrap();
    write_doc(
        dir.path(),
        "pass.html",
        &test_doc("Passing Test", &[&["open", "/", ""]]),
    );
    write_doc(
        dir.path(),
        "fail.html",
        &test_doc("Failing Test", &[&["clickBroken", "id=go", ""]]),
    );
    let suite_path = write_doc(
        dir.path(),
        "suite.html",
        "<html><body><table>\n\
         <tr><td>Smoke Suite</td></tr>\n\
         <tr><td><a href=\"pass.html\">Pass</a></td></tr>\n\
         <tr><td><a href=\"fail.html\">Fail</a></td></tr>\n\
         </table></body></html>\n",
    );

    let cfg = config(addr);
    let suite = SuiteRunner::new(&cfg).run(&suite_path).await.unwrap();

    assert_eq!(suite.name, "Smoke Suite");
    assert!(!suite.passed());
    assert_eq!(suite.tests.len(), 2, "a failing test never aborts the suite");
    assert!(suite.tests[0].passed());
    assert!(!suite.tests[1].passed());

    // One fresh session per test
    let commands = wire_commands(&log);
    assert_eq!(
        commands
            .iter()
            .filter(|c| c.as_str() == "getNewBrowserSession")
            .count(),
        2
    );

    let html = report::render(&report::from_suite(&suite, &cfg));
    assert!(html.contains("Test Suite Results"));
    assert!(html.contains("FAILED"));
    assert!(html.contains("<a href=\"#Pass\">Pass</a>"));
    assert!(html.contains("<a name=\"Fail\">"));
}

#[tokio::test]
async fn refused_session_turns_the_test_errored() {
    let (addr, log) = spawn_server(HashMap::from([(
        "getNewBrowserSession".to_string(),
        "ERROR: no browser available".to_string(),
    )]))
    .await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(
        dir.path(),
        "login.html",
        &test_doc("Login Test", &[&["open", "/login", ""]]),
    );

    let cfg = config(addr);
    let test = TestRunner::new(&cfg).run(&path, None).await.unwrap();

    assert!(matches!(test.state, TestState::Errored { .. }));
    assert!(test.commands.is_empty());
    assert!(!test.passed());

    // A session that never started is never stopped
    let commands = wire_commands(&log);
    assert!(!commands.iter().any(|c| c == "testComplete"));

    let html = report::render(&report::from_test(&test, &cfg));
    assert!(html.contains("ERROR"));
    assert!(html.contains("class=\"error\""));
}

#[tokio::test]
async fn base_url_is_adopted_from_the_document_link() {
    let (addr, log) = spawn_server(Script::new()).await;
    let dir = tempfile::tempdir().unwrap();
    let path = write_doc(
        dir.path(),
        "linked.html",
        "<html><head><link rel=\"base\" href=\"http://from-doc.example/\"/></head>\
         <body><table>\n\
         <tr><td colspan=\"3\">Linked Test</td></tr>\n\
         <tr><td>open</td><td>/</td><td></td></tr>\n\
         </table></body></html>\n",
    );

    let mut cfg = config(addr);
    cfg.base_url = None;
    let test = TestRunner::new(&cfg).run(&path, None).await.unwrap();
    assert_eq!(test.state, TestState::Passed);

    let start_args = log.lock().unwrap()[0].1.clone();
    assert_eq!(start_args[0], "*mock");
    assert_eq!(start_args[1], "http://from-doc.example/");
}
