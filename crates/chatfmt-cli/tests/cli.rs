use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    if let Some(path) = env::var_os("CARGO_BIN_EXE_chatfmt-cli") {
        return PathBuf::from(path);
    }
    if let Some(path) = env::var_os("CARGO_BIN_EXE_chatfmt_cli") {
        return PathBuf::from(path);
    }
    let exe = env::current_exe().expect("current exe");
    let mut debug_dir = exe.as_path();
    while let Some(parent) = debug_dir.parent() {
        if parent.file_name().and_then(|name| name.to_str()) == Some("debug") {
            let candidate = parent.join("chatfmt-cli");
            if candidate.exists() {
                return candidate;
            }
        }
        debug_dir = parent;
    }
    panic!("binary path missing");
}

fn temp_path(name: &str, ext: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    path.push(format!(
        "chatfmt_cli_{}_{}_{}.{}",
        name,
        now.as_secs(),
        now.subsec_nanos(),
        ext
    ));
    path
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = temp_path(name, "txt");
    fs::write(&path, contents).expect("write temp file");
    path
}

fn run(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(bin_path()).args(args).output().expect("run");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn raw_outputs_fragment_html() {
    let input = temp_file("raw", "hello **world**\n");
    let (ok, stdout, _) = run(&["--raw", input.to_str().expect("path")]);
    assert!(ok, "expected success exit code");
    assert!(!stdout.contains("<!DOCTYPE html>"), "expected raw HTML");
    assert!(stdout.contains("<p>hello <strong>world</strong></p>"));
}

#[test]
fn render_wraps_html_with_assets() {
    let input = temp_file("render", "see example.com\n");
    let (ok, stdout, _) = run(&[input.to_str().expect("path")]);
    assert!(ok, "expected success exit code");
    assert!(stdout.contains("<!DOCTYPE html>"), "expected HTML wrapper");
    assert!(stdout.contains("<style>"), "expected inline CSS");
    assert!(!stdout.contains("<script>"), "expected no inline JS by default");
    assert!(stdout.contains("href='http://example.com'"));
}

#[test]
fn js_flag_inlines_click_script() {
    let input = temp_file("render_js", "#general\n");
    let (ok, stdout, _) = run(&["--js", "--theme", "dark", input.to_str().expect("path")]);
    assert!(ok, "expected success exit code");
    assert!(stdout.contains("<script>"));
    assert!(stdout.contains("data-hashtag='#general'"));
}

#[test]
fn users_and_keys_drive_mentions() {
    let users = temp_file("users", "alice\n\n@Bob\n");
    let input = temp_file("mentions", "@alice and @bob and @carol\n");
    let (ok, stdout, _) = run(&[
        "--raw",
        "--users-file",
        users.to_str().expect("path"),
        "--mention-key",
        "@bob",
        input.to_str().expect("path"),
    ]);
    assert!(ok, "expected success exit code");
    assert!(stdout.contains("data-mention='alice'"));
    assert!(stdout.contains(
        "<span class='mention-highlight'><a class='mention-link' href='#' \
         data-mention='bob'>@bob</a></span>"
    ));
    assert!(stdout.contains("@carol"));
    assert!(!stdout.contains("data-mention='carol'"));
}

#[test]
fn plain_mode_reads_stdin() {
    let mut child = Command::new(bin_path())
        .args(["--raw", "--no-markdown", "--search", "b"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"a <i> b\nc")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim_end(),
        "a &lt;i&gt; <span class='search-highlight'>b</span><br />c"
    );
}

#[test]
fn singleline_flag_collapses_lines() {
    let input = temp_file("singleline", "one\ntwo\n");
    let (ok, stdout, _) = run(&[
        "--raw",
        "--no-markdown",
        "--singleline",
        input.to_str().expect("path"),
    ]);
    assert!(ok);
    assert_eq!(stdout.trim_end(), "one two");
}

#[test]
fn assets_flag_writes_files() {
    let input = temp_file("assets", "hi\n");
    let dir = temp_path("assets_dir", "d");
    let (ok, _, _) = run(&[
        "--assets",
        dir.to_str().expect("path"),
        input.to_str().expect("path"),
    ]);
    assert!(ok);
    assert!(dir.join("chatfmt.css").exists());
    assert!(dir.join("chatfmt.js").exists());
}

#[test]
fn bad_theme_is_rejected() {
    let (ok, _, stderr) = run(&["--theme", "sepia"]);
    assert!(!ok, "expected error exit code");
    assert!(stderr.contains("--theme expects"));
}

#[test]
fn missing_input_file_fails() {
    let missing = temp_path("missing", "txt");
    let (ok, _, stderr) = run(&[missing.to_str().expect("path")]);
    assert!(!ok);
    assert!(stderr.contains("failed to read"));
}
