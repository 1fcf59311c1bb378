use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

struct TestProject {
    root: PathBuf,
}

impl TestProject {
    fn new() -> Self {
        let root = unique_temp_dir("guess");
        fs::create_dir_all(root.join(".upm")).expect("create .upm");
        fs::create_dir_all(root.join("src").join("components")).expect("create src");
        fs::create_dir_all(root.join("node_modules").join("react")).expect("create node_modules");
        fs::write(
            root.join(".upm").join("config.toml"),
            "[guess]\nbuiltins = [\"fs\", \"path\", \"http\"]\n",
        )
        .expect("write config");
        fs::write(
            root.join("src").join("index.js"),
            r#"import React from "react";
const utils = require("./utils");
const debounce = import("lodash/debounce");
const fs = require("fs");
"#,
        )
        .expect("write index.js");
        fs::write(
            root.join("src").join("components").join("Button.tsx"),
            r#"import { css } from '@emotion/react/macro';
import 'style-loader!css-loader!./button.css';
export { theme } from "../theme";
"#,
        )
        .expect("write Button.tsx");
        fs::write(
            root.join("node_modules").join("react").join("index.js"),
            "module.exports = require('loose-envify');\n",
        )
        .expect("write vendored file");
        fs::write(
            root.join("package.json"),
            r#"{"dependencies": {"react": "^18.2.0"}}"#,
        )
        .expect("write package.json");
        Self { root }
    }

    fn run_upm(&self, args: &[&str]) -> std::process::Output {
        Command::new(upm_bin())
            .arg("--dir")
            .arg(&self.root)
            .args(args)
            .env_remove("UPM_PROJECT_DIR")
            .env_remove("UPM_NODE")
            .output()
            .expect("run upm-yarn")
    }
}

impl Drop for TestProject {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn upm_bin() -> PathBuf {
    PathBuf::from(
        std::env::var("CARGO_BIN_EXE_upm-yarn")
            .expect("CARGO_BIN_EXE_upm-yarn is not set for integration test"),
    )
}

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos();
    let pid = std::process::id();
    std::env::temp_dir().join(format!("upm-{prefix}-{pid}-{nanos}"))
}

fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    assert!(
        output.status.success(),
        "command failed\nstdout:\n{stdout}\nstderr:\n{stderr}"
    );
    stdout.lines().map(str::to_string).collect()
}

#[test]
fn guess_all_reports_every_external_package() {
    let project = TestProject::new();
    let output = project.run_upm(&["guess", "--all"]);
    assert_eq!(stdout_lines(&output), vec!["@emotion/react", "lodash", "react"]);
}

#[test]
fn guess_hides_packages_already_declared() {
    let project = TestProject::new();
    let output = project.run_upm(&["guess"]);
    assert_eq!(stdout_lines(&output), vec!["@emotion/react", "lodash"]);
}

#[test]
fn guess_emits_json_array() {
    let project = TestProject::new();
    let output = project.run_upm(&["--format", "json", "guess", "--all"]);
    let text = stdout_lines(&output).join("\n");
    let value: serde_json::Value = serde_json::from_str(&text).expect("parse json output");
    assert_eq!(
        value,
        serde_json::json!(["@emotion/react", "lodash", "react"])
    );
}
