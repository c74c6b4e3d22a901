#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Runs the `roster` binary against a config file in an isolated temp directory.
pub struct RosterTest {
    pub temp_dir: TempDir,
    binary_path: PathBuf,
    env: Vec<(String, String)>,
}

impl RosterTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        RosterTest {
            temp_dir,
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_roster")),
            env: Vec::new(),
        }
    }

    /// Point the config at a GraphQL endpoint.
    pub fn with_endpoint(self, url: &str) -> Self {
        self.write_config(&format!("api:\n  url: {url}\n"));
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write config file");
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_path()).expect("Failed to read config file")
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let mut command = Command::new(&self.binary_path);
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("ROSTER_CONFIG", self.config_path())
            .env_remove("ROSTER_API_URL")
            .env_remove("ROSTER_API_TOKEN")
            .env_remove("ROSTER_LOG")
            .env("NO_COLOR", "1");
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command.output().expect("Failed to execute roster command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
    }
}
