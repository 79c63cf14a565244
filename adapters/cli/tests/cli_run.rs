use std::path::Path;
use std::process::Command;

fn run(level: &str, extra: &[&str]) -> (String, bool) {
    let level = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(level);
    let output = Command::new(env!("CARGO_BIN_EXE_torchlit"))
        .arg(level)
        .args(extra)
        .output()
        .expect("failed to launch the torchlit binary");
    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        output.status.success(),
    )
}

#[test]
fn monsterless_level_is_an_immediate_win() {
    let (stdout, success) = run("empty.txt", &["--quiet", "--summary-json"]);
    assert!(success);
    assert!(stdout.contains("You win!"));
    assert!(stdout.contains("\"outcome\":\"won\""));
    assert!(stdout.contains("\"monsters_alive\":0"));
}

#[test]
fn frame_limit_ends_an_undecided_run() {
    let (stdout, success) = run(
        "still.txt",
        &["--quiet", "--frames", "2", "--summary-json"],
    );
    assert!(success);
    assert!(stdout.contains("Frame limit reached."));
    assert!(stdout.contains("\"outcome\":\"frame_limit\""));
    assert!(stdout.contains("\"frames\":2"));
}

#[test]
fn missing_level_file_fails_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_torchlit"))
        .arg("no-such-level.txt")
        .output()
        .expect("failed to launch the torchlit binary");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not read level file"));
}
