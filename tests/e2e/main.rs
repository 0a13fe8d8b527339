//! End-to-end tests driving the `baler` binary.

use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use predicates::prelude::*;
use std::path::PathBuf;

pub mod archive;
pub mod config;

pub const APP: &str = "myapp";
pub const VERSION: &str = "1.2.0";

/// Isolated workspace plus config directory for one test
pub struct TestContext {
    pub temp: TempDir,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        temp.child("config").create_dir_all().unwrap();
        temp.child(APP).create_dir_all().unwrap();
        Self { temp }
    }

    /// Workspace root (`<temp>/myapp`)
    pub fn root(&self) -> PathBuf {
        self.temp.child(APP).to_path_buf()
    }

    /// `baler` running in the workspace with config isolated to the temp dir
    pub fn baler(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("baler").unwrap();
        cmd.current_dir(self.root());

        let config_dir = self.temp.child("config").to_path_buf();
        if cfg!(target_os = "windows") {
            cmd.env("APPDATA", &config_dir);
            cmd.env("USERPROFILE", self.temp.path());
        } else if cfg!(target_os = "linux") {
            cmd.env("XDG_CONFIG_HOME", &config_dir);
            cmd.env("HOME", self.temp.path());
        } else {
            cmd.env("HOME", self.temp.path());
        }

        cmd
    }

    pub fn write_manifest(&self) {
        self.temp
            .child(APP)
            .child("baler.yaml")
            .write_str(&format!("name: {}\nversion: {}\n", APP, VERSION))
            .unwrap();
    }

    /// Site config under `XDG_CONFIG_HOME` (Linux layout)
    pub fn write_config(&self, content: &str) {
        self.temp
            .child("config/baler/config.yaml")
            .write_str(content)
            .unwrap();
    }

    /// Entry point that carries the boot marker and exits 0 for every call
    #[cfg(unix)]
    pub fn write_boot_entry(&self) {
        use std::os::unix::fs::PermissionsExt;

        let entry = self.temp.child(APP).child("lbin").child(APP);
        entry
            .write_str("#!/bin/sh\n# This file was generated by Boot\nexit 0\n")
            .unwrap();
        std::fs::set_permissions(entry.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    pub fn write_file(&self, relative: &str, content: &str) {
        self.temp
            .child(APP)
            .child(relative)
            .write_str(content)
            .unwrap();
    }
}

#[test]
fn test_help_lists_commands() {
    let ctx = TestContext::new();
    ctx.baler()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("archive"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version() {
    let ctx = TestContext::new();
    ctx.baler()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("baler"));
}
