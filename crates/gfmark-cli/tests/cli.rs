use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gfmark-cli"))
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    let file_name = format!(
        "gfmark_cli_{}_{}_{}.md",
        name,
        now.as_secs(),
        now.subsec_nanos()
    );
    path.push(file_name);
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn renders_file_to_fragment() {
    let input = temp_file("fragment", "Paragraph.\n");
    let output = Command::new(bin_path())
        .arg(&input)
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("<!DOCTYPE html>"), "expected a fragment");
    assert!(stdout.contains("<p>Paragraph.</p>"));
}

#[test]
fn reads_stdin_without_input_path() {
    let mut child = Command::new(bin_path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"# From stdin\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name=\"from-stdin\""));
}

#[test]
fn page_wraps_html_with_stylesheet() {
    let input = temp_file("page", "```diff\n-a\n+b\n```\n");
    let output = Command::new(bin_path())
        .arg("--page")
        .arg(&input)
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<!DOCTYPE html>"), "expected HTML wrapper");
    assert!(stdout.contains("<style>"), "expected inline CSS");
    assert!(stdout.contains(".highlight-diff"));
    assert!(stdout.contains("<div class=\"highlight highlight-diff\">"));
}

#[test]
fn unsanitized_keeps_raw_html() {
    let input = temp_file("unsanitized", "<div onclick=\"x()\">hi</div>\n");
    let sanitized = Command::new(bin_path())
        .arg(&input)
        .output()
        .expect("run");
    let raw = Command::new(bin_path())
        .arg("--unsanitized")
        .arg(&input)
        .output()
        .expect("run");

    assert!(!String::from_utf8_lossy(&sanitized.stdout).contains("onclick"));
    assert!(String::from_utf8_lossy(&raw.stdout).contains("onclick"));
}

#[test]
fn no_highlight_renders_plain_blocks() {
    let input = temp_file("no_highlight", "```rust\nfn main() {}\n```\n");
    let output = Command::new(bin_path())
        .arg("--no-highlight")
        .arg(&input)
        .output()
        .expect("run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<pre><code>fn main() {}\n</code></pre>"));
    assert!(!stdout.contains("highlight-rust"));
}

#[test]
fn no_intraline_skips_change_spans() {
    let input = temp_file("no_intraline", "```diff\n-a b\n+a c\n```\n");
    let output = Command::new(bin_path())
        .arg("--no-intraline")
        .arg(&input)
        .output()
        .expect("run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("class=\"gd input-block\""));
    assert!(!stdout.contains("class=\"x\""));
}

#[test]
fn diagnostics_json_is_empty_array_for_clean_input() {
    let input = temp_file("diag_clean", "Paragraph.\n");
    let output = Command::new(bin_path())
        .args(["--diagnostics", "json"])
        .arg(&input)
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    let parsed: serde_json::Value = serde_json::from_str(stderr.trim()).expect("json");
    assert_eq!(parsed, serde_json::json!([]));
}

#[test]
fn missing_input_exits_with_error() {
    let output = Command::new(bin_path())
        .arg("/nonexistent/gfmark/input.md")
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
}
