use scry_commands::fixtures;
use std::io::Write;
use std::process::{Command, Stdio};

fn image_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp image");
    let json = serde_json::to_string(&fixtures::sample_image()).expect("serialize");
    file.write_all(json.as_bytes()).expect("write snapshot");
    file
}

fn scry() -> Command {
    Command::new(env!("CARGO_BIN_EXE_scry"))
}

#[test]
fn eval_renders_the_filtered_table() {
    let img = image_file();
    let out = scry()
        .arg("--image")
        .arg(img.path())
        .args(["-e", "dbuf --object 5 | dbuf --has-holds"])
        .output()
        .expect("spawn");
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8(out.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("0x2400"));
    assert!(lines[1].ends_with("pool/data"));
}

#[test]
fn unknown_command_exits_with_usage_status() {
    let img = image_file();
    let out = scry()
        .arg("--image")
        .arg(img.path())
        .args(["-e", "nosuch"])
        .output()
        .expect("spawn");
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unknown command: nosuch"));
}

#[test]
fn misplaced_renderer_exits_with_validation_status() {
    let img = image_file();
    let out = scry()
        .arg("--image")
        .arg(img.path())
        .args(["-e", "help | dbuf"])
        .output()
        .expect("spawn");
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn eval_help_lists_the_builtins() {
    let img = image_file();
    let out = scry()
        .arg("--image")
        .arg(img.path())
        .args(["-e", "help"])
        .output()
        .expect("spawn");
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).expect("utf8");
    assert!(stdout.contains("dbuf - "));
    assert!(stdout.contains("help - "));
}

#[test]
fn stdin_loop_reports_errors_and_keeps_going() {
    let img = image_file();
    let mut child = scry()
        .arg("--image")
        .arg(img.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"nosuch\n\ndbuf --blkid 7\n")
        .expect("feed stdin");
    let out = child.wait_with_output().expect("wait");
    assert!(out.status.success(), "loop errors are not fatal");
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unknown command: nosuch"));
    let stdout = String::from_utf8(out.stdout).expect("utf8");
    assert!(stdout.lines().any(|l| l.contains("0x2400")));
}

#[test]
fn unreadable_image_is_a_dependency_failure() {
    let out = scry()
        .args(["--image", "/nonexistent/snapshot.json", "-e", "help"])
        .output()
        .expect("spawn");
    assert_eq!(out.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&out.stderr).contains("cannot read image"));
}

#[test]
fn malformed_snapshot_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().expect("temp image");
    file.write_all(b"not a snapshot").expect("write");
    let out = scry()
        .arg("--image")
        .arg(file.path())
        .args(["-e", "help"])
        .output()
        .expect("spawn");
    assert_eq!(out.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid image snapshot"));
}
