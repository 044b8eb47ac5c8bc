use std::{fs, path::PathBuf, process::Command};

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gate-runner-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("scratch directory");
    let path = dir.join(name);
    fs::write(&path, contents).expect("scratch file");
    path
}

fn gate_runner() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_gate-runner"));
    let _ = command.env("RUST_LOG", "off");
    command
}

#[test]
fn validate_reports_each_map() {
    let good = scratch_file("good.ber", "11111\n1PCE1\n11111\n");
    let bad = scratch_file("bad.ber", "11111\n1PCE1\n11011\n");

    let output = gate_runner()
        .arg("validate")
        .arg(&good)
        .arg(&bad)
        .output()
        .expect("binary runs");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success(), "a broken map must fail validation");
    assert!(stdout.contains("ok    "), "{stdout}");
    assert!(
        stdout.contains("border cell (2, 2) must be a wall or the exit"),
        "{stdout}"
    );
}

#[test]
fn simulate_prints_a_json_summary() {
    let level = scratch_file("corridor.ber", "11111\n1PCE1\n10001\n10001\n11111\n");
    let config = scratch_file("calm.toml", "[enemies]\nspawn_chance = 0.0\n");

    let output = gate_runner()
        .args(["simulate", "--moves", "dd", "--move-every", "1", "--json", "--config"])
        .arg(&config)
        .arg(&level)
        .output()
        .expect("binary runs");

    assert!(output.status.success());
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(summary["outcome"], "Victory");
    assert_eq!(summary["campaign_complete"], true);
    assert_eq!(summary["level"], "corridor");
}

#[test]
fn unknown_script_keys_fail_the_run() {
    let level = scratch_file("script.ber", "11111\n1PCE1\n10001\n10001\n11111\n");

    let output = gate_runner()
        .args(["simulate", "--moves", "dx"])
        .arg(&level)
        .output()
        .expect("binary runs");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown key 'x'"), "{stderr}");
}
