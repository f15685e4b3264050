#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

// UBX ACK-ACK for CFG-MSG: class 0x05, id 0x01, content 06 01.
const UBX_ACK: &str = "b5620501020006010f38";
const UBX_ACK_BAD_CHECKSUM: &str = "b56205010200060100ff";

fn schema_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../schemas")
}

fn ringframe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ringframe"))
        .args(["--log-level", "off"])
        .args(args)
        .env_remove("RINGFRAME_SCHEMA_DIR")
        .output()
        .expect("ringframe should run")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be json"))
        .collect()
}

#[test]
fn decode_hex_skips_noise_and_prints_json() {
    let dir = schema_dir();
    let input = format!("00ff13{UBX_ACK}");
    let output = ringframe(&[
        "--format",
        "json",
        "decode",
        "--schema-dir",
        dir.to_str().unwrap(),
        "--schema",
        "ubx",
        "--hex",
        &input,
    ]);

    assert!(output.status.success());
    let frames = json_lines(&output);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["schema"], "ubx");
    assert_eq!(frames[0]["command"], 0x0105);
    assert_eq!(frames[0]["content_hex"], "0601");
    assert_eq!(frames[0]["content_size"], 2);
    assert!(frames[0]["schema_id"]
        .as_str()
        .unwrap()
        .ends_with("frame-decoded.schema.json"));
}

#[test]
fn decode_continues_after_rejected_frame() {
    let dir = schema_dir();
    let input = format!("{UBX_ACK_BAD_CHECKSUM}{UBX_ACK}");
    let output = ringframe(&[
        "--format",
        "json",
        "decode",
        "--schema-file",
        dir.join("ubx.schema.json").to_str().unwrap(),
        "--hex",
        &input,
        "--chunk-size",
        "3",
    ]);

    assert!(output.status.success());
    let frames = json_lines(&output);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["content_hex"], "0601");
}

#[test]
fn strict_decode_exits_60_on_rejected_frame() {
    let dir = schema_dir();
    let input = format!("{UBX_ACK_BAD_CHECKSUM}{UBX_ACK}");
    let output = ringframe(&[
        "decode",
        "--schema-file",
        dir.join("ubx.schema.json").to_str().unwrap(),
        "--hex",
        &input,
        "--strict",
    ]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("checksum mismatch"));
}

#[test]
fn decode_count_stops_early() {
    let dir = schema_dir();
    let input = format!("{UBX_ACK}{UBX_ACK}{UBX_ACK}");
    let output = ringframe(&[
        "--format",
        "json",
        "decode",
        "--schema-file",
        dir.join("ubx.schema.json").to_str().unwrap(),
        "--hex",
        &input,
        "--count",
        "2",
    ]);

    assert!(output.status.success());
    assert_eq!(json_lines(&output).len(), 2);
}

#[test]
fn decode_reads_stdin() {
    let dir = schema_dir();
    let mut child = Command::new(env!("CARGO_BIN_EXE_ringframe"))
        .args(["--log-level", "off", "--format", "pretty", "decode"])
        .arg("--schema-dir")
        .arg(&dir)
        .args(["--schema", "nmea", "--capacity", "32"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("decode should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"garbage$GPGGA,1\r\n$GPRMC,2\r\n$partial")
        .expect("stdin should accept input");
    let output = child.wait_with_output().expect("decode should finish");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("#0 "));
    assert!(lines[0].ends_with("content=GPGGA,1"));
    assert!(lines[1].ends_with("content=GPRMC,2"));
}

#[test]
fn encode_then_decode_round_trips() {
    let dir = schema_dir();
    let schema_file = dir.join("efff.schema.json");
    let encoded = ringframe(&[
        "--format",
        "pretty",
        "encode",
        "--schema-file",
        schema_file.to_str().unwrap(),
        "--command",
        "0x0201",
        "--data",
        "hello",
    ]);
    assert!(encoded.status.success());
    let wire = String::from_utf8_lossy(&encoded.stdout).trim().to_string();
    assert!(wire.starts_with("efff0102"));
    assert!(wire.ends_with("0e0f"));

    let decoded = ringframe(&[
        "--format",
        "json",
        "decode",
        "--schema-file",
        schema_file.to_str().unwrap(),
        "--hex",
        &wire,
    ]);
    assert!(decoded.status.success());
    let frames = json_lines(&decoded);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["command"], 0x0201);
    assert_eq!(frames[0]["content_text"], "hello");
}

#[test]
fn encode_rejects_suffix_inside_free_content() {
    let dir = schema_dir();
    let output = ringframe(&[
        "encode",
        "--schema-file",
        dir.join("nmea.schema.json").to_str().unwrap(),
        "--hex",
        "410d0a42",
    ]);

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn schemas_lists_directory() {
    let dir = schema_dir();
    let output = ringframe(&["--format", "json", "schemas", "--schema-dir", dir.to_str().unwrap()]);

    assert!(output.status.success());
    let listing = json_lines(&output);
    let names: Vec<&str> = listing[0]["schemas"]
        .as_array()
        .expect("schemas should be an array")
        .iter()
        .filter_map(|schema| schema["name"].as_str())
        .collect();
    assert_eq!(names, vec!["efff", "nmea", "ubx"]);
}

#[test]
fn missing_schema_is_a_usage_error() {
    let output = ringframe(&["decode", "--hex", UBX_ACK]);
    assert_eq!(output.status.code(), Some(64));

    let dir = schema_dir();
    let ambiguous = ringframe(&["decode", "--schema-dir", dir.to_str().unwrap(), "--hex", UBX_ACK]);
    assert_eq!(ambiguous.status.code(), Some(64));
}

#[test]
fn window_smaller_than_frame_is_a_usage_error() {
    let dir = schema_dir();
    let output = ringframe(&[
        "decode",
        "--schema-file",
        dir.join("ubx.schema.json").to_str().unwrap(),
        "--hex",
        UBX_ACK,
        "--capacity",
        "4",
    ]);

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_reports_package_version() {
    let output = ringframe(&["version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("ringframe {}", env!("CARGO_PKG_VERSION"))
    );
}
