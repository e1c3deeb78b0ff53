// SPDX-License-Identifier: MIT OR Apache-2.0
//! Integration tests for the `xapian-port` binary.

use assert_cmd::Command;
use predicates::str::contains;
use std::io::Write;
use xdrv_codec::Reply;

fn port() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("xapian-port").expect("binary `xapian-port` should be built");
    cmd.env_remove("XDRV_LOG_LEVEL")
        .env_remove("XDRV_MAX_FRAME_BYTES")
        .env_remove("XDRV_MAX_REPLY_BYTES");
    cmd
}

fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = (body.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(body);
    out
}

fn command(id: i32, params: &[u8]) -> Vec<u8> {
    let mut body = id.to_le_bytes().to_vec();
    body.extend_from_slice(params);
    frame(&body)
}

fn open_read_write(path: &str) -> Vec<u8> {
    let mut params = vec![1u8];
    params.extend_from_slice(&(path.len() as u32).to_le_bytes());
    params.extend_from_slice(path.as_bytes());
    command(0, &params)
}

fn replies(mut stdout: &[u8]) -> Vec<Reply> {
    let mut out = Vec::new();
    while !stdout.is_empty() {
        let len = u32::from_be_bytes(stdout[..4].try_into().unwrap()) as usize;
        out.push(Reply::decode(&stdout[4..4 + len]).unwrap());
        stdout = &stdout[4 + len..];
    }
    out
}

fn tags(replies: &[Reply]) -> Vec<Option<&str>> {
    replies
        .iter()
        .map(|r| match r {
            Reply::Ok(_) => None,
            Reply::Error(report) => Some(report.tag.as_str()),
        })
        .collect()
}

// ── Help & version ──────────────────────────────────────────────────

#[test]
fn help_flag_prints_usage() {
    port()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Xapian port driver process"))
        .stdout(contains("--config"))
        .stdout(contains("--debug"));
}

#[test]
fn version_flag_prints_version() {
    port()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

// ── Port loop ───────────────────────────────────────────────────────

#[test]
fn empty_stdin_exits_cleanly() {
    let out = port().write_stdin(Vec::new()).assert().success();
    assert!(out.get_output().stdout.is_empty());
}

#[test]
fn session_over_stdio() {
    let mut input = command(4, &[]);
    input.extend(open_read_write("/tmp/index"));
    input.extend(command(1, &[3, 0, 0, 0, b'a', b'b', b'c']));
    input.extend(command(2, &7u32.to_le_bytes()));
    input.extend(command(42, &[]));
    input.extend(open_read_write("/tmp/other"));

    let out = port().write_stdin(input).assert().success();
    let replies = replies(&out.get_output().stdout);
    assert_eq!(
        tags(&replies),
        vec![
            Some("DbNotReadyError"),
            None,
            None,
            Some("ElementNotFoundError"),
            Some("BadCommandError"),
            Some("DbAlreadyOpenedError"),
        ]
    );
    assert_eq!(replies[2], Reply::Ok(1u32.to_le_bytes().to_vec()));
    match &replies[4] {
        Reply::Error(report) => assert_eq!(report.message, "Unknown command with id = 42."),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn truncated_frame_fails_the_process() {
    port()
        .write_stdin(vec![0, 0, 0, 9, 1])
        .assert()
        .failure()
        .stderr(contains("port loop"));
}

#[test]
fn failures_are_logged_to_stderr() {
    port()
        .write_stdin(command(-5, &[]))
        .assert()
        .success()
        .stderr(contains("command failed"))
        .stderr(contains("BadCommandError"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn config_file_sets_frame_limit() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_frame_bytes = 8").unwrap();
    writeln!(file, "max_reply_bytes = 8").unwrap();

    let out = port()
        .arg("--config")
        .arg(file.path())
        .write_stdin(command(4, &[0; 12]))
        .assert()
        .success();
    let replies = replies(&out.get_output().stdout);
    match &replies[0] {
        Reply::Error(report) => {
            assert_eq!(report.tag, "MemoryAllocationError");
            assert_eq!(report.message, "Cannot allocate 16 bytes.");
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn env_override_sets_frame_limit() {
    let out = port()
        .env("XDRV_MAX_FRAME_BYTES", "2")
        .env("XDRV_MAX_REPLY_BYTES", "4")
        .write_stdin(command(4, &[]))
        .assert()
        .success();
    let replies = replies(&out.get_output().stdout);
    assert_eq!(tags(&replies), vec![Some("MemoryAllocationError")]);
}

#[test]
fn reply_limit_below_one_u32_is_rejected() {
    port()
        .env("XDRV_MAX_REPLY_BYTES", "3")
        .write_stdin(command(4, &[]))
        .assert()
        .failure()
        .stderr(contains("max_reply_bytes 3 out of range"));
}

#[test]
fn missing_config_file_fails() {
    port()
        .args(["--config", "/nonexistent/xapian-port.toml"])
        .assert()
        .failure()
        .stderr(contains("config file not found"));
}

#[test]
fn invalid_config_fails_validation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "log_level = \"chatty\"").unwrap();
    port()
        .arg("--config")
        .arg(file.path())
        .arg("--check-config")
        .assert()
        .failure()
        .stderr(contains("validate config"));
}

#[test]
fn check_config_reports_warnings() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_frame_bytes = 1024").unwrap();
    port()
        .arg("--config")
        .arg(file.path())
        .arg("--check-config")
        .assert()
        .success()
        .stderr(contains("exceeds max_frame_bytes"))
        .stderr(contains("config ok"));
}
