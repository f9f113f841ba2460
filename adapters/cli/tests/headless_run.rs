use std::process::Command;

fn runner() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tile-defence"))
}

#[test]
fn bundled_settings_play_to_a_summary() {
    let config = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
    let output = runner()
        .args(["--config", config, "--duration", "20", "--tick-rate", "20"])
        .env("RUST_LOG", "off")
        .output()
        .expect("runner starts");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ticks:        400"), "{stdout}");
    assert!(stdout.contains("final health:"), "{stdout}");
}

#[test]
fn malformed_tower_arguments_are_rejected() {
    let output = runner()
        .args(["--tower", "3,laser"])
        .output()
        .expect("runner starts");
    assert!(!output.status.success());
}

#[test]
fn a_missing_settings_file_fails_with_its_path() {
    let output = runner()
        .args(["--config", "/nonexistent/tile-defence.toml"])
        .env("RUST_LOG", "off")
        .output()
        .expect("runner starts");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/nonexistent/tile-defence.toml"), "{stderr}");
}
