#![cfg(feature = "cli")]

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::fs;

#[test]
fn colors_lists_builtins() {
    Command::cargo_bin("pixeltrack")
        .expect("binary")
        .arg("colors")
        .assert()
        .success()
        .stdout(predicate::str::contains("cyan"))
        .stdout(predicate::str::contains("magenta"))
        .stdout(predicate::str::contains("yellow"));
}

#[test]
fn track_writes_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image_path = dir.path().join("frame.png");
    let img = RgbaImage::from_fn(64, 48, |x, y| {
        if (20..50).contains(&x) && (10..40).contains(&y) {
            Rgba([0, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    });
    img.save(&image_path).expect("save");

    let config_path = dir.path().join("cfg.json");
    let report_path = dir.path().join("report.json");
    let config = serde_json::json!({
        "image_path": image_path,
        "tracker": { "kind": "color", "params": { "colors": ["cyan"] } }
    });
    fs::write(&config_path, config.to_string()).expect("write config");

    Command::cargo_bin("pixeltrack")
        .expect("binary")
        .args(["track", "--config"])
        .arg(&config_path)
        .arg("--out")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 results"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("report")).expect("json");
    assert_eq!(report["results"]["kind"], "color");
    assert_eq!(report["results"]["items"][0]["color"], "cyan");
    assert_eq!(report["results"]["items"][0]["x"], 20);
    assert_eq!(report["results"]["items"][0]["width"], 29);
}

#[test]
fn missing_config_fails() {
    Command::cargo_bin("pixeltrack")
        .expect("binary")
        .args(["track", "--config", "/nonexistent/pixeltrack.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}
