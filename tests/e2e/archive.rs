use super::*;
use std::fs::File;

#[test]
fn test_archive_help_lists_flags() {
    let ctx = TestContext::new();
    ctx.baler()
        .args(["archive", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--local"))
        .stdout(predicate::str::contains("--no-local"))
        .stdout(predicate::str::contains("--exclude"));
}

#[test]
fn test_local_and_no_local_conflict() {
    let ctx = TestContext::new();
    ctx.write_manifest();

    ctx.baler()
        .args(["archive", "--local", "--no-local"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_missing_manifest() {
    let ctx = TestContext::new();

    ctx.baler()
        .arg("archive")
        .assert()
        .failure()
        .stderr(predicate::str::contains("baler.yaml"));
}

#[test]
fn test_missing_boot_marker_aborts_without_changes() {
    let ctx = TestContext::new();
    ctx.write_manifest();
    ctx.write_file("src/app.rb", "puts 1");

    ctx.baler()
        .arg("archive")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Precondition failed"))
        .stderr(predicate::str::contains("latest boot system"));

    assert!(!ctx.root().join("tmp").exists());
    assert!(!ctx.temp.child("myapp_copy").path().exists());
}

#[test]
fn test_stale_marker_aborts() {
    let ctx = TestContext::new();
    ctx.write_manifest();
    ctx.write_file("lbin/myapp", "#!/bin/sh\nexec ruby app.rb\n");

    ctx.baler()
        .args(["archive", "--local"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not generated by the current boot system"));

    assert!(!ctx.root().join("vendor").exists());
}

/// Full pipeline with `true` standing in for the dependency manager
#[cfg(target_os = "linux")]
#[test]
fn test_full_archive_end_to_end() {
    let ctx = TestContext::new();
    ctx.write_manifest();
    ctx.write_boot_entry();
    ctx.write_config(
        "gem_install_dir: /tmp/baler-gems\ndependency_manager:\n  program: \"true\"\n",
    );
    ctx.write_file("src/app.rb", "puts 1");
    ctx.write_file("log/run.log", "noise");
    ctx.write_file("simulation/wave.dat", "noise");
    ctx.write_file("log2/notes.txt", "keep");
    ctx.write_file("src/.svn/entries", "meta");

    ctx.baler()
        .args(["archive", "--exclude", "simulation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("archive is complete"));

    let artifact = ctx.root().join("tmp/myapp-1.2.0.tar.gz");
    assert!(artifact.exists());
    assert!(!ctx.root().join("tmp/myapp-1.2.0").exists());
    assert!(!ctx.temp.child("myapp_copy").path().exists());

    let gz = flate2::read::GzDecoder::new(File::open(&artifact).unwrap());
    let mut archive = tar::Archive::new(gz);
    let entries: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path().unwrap().to_string_lossy().to_string();
            path.trim_start_matches("./").to_string()
        })
        .collect();

    assert!(entries.iter().any(|e| e == "myapp-1.2.0/src/app.rb"));
    assert!(entries.iter().any(|e| e == "myapp-1.2.0/log2/notes.txt"));
    assert!(entries.iter().any(|e| e == "myapp-1.2.0/.baler_archive"));
    assert!(!entries.iter().any(|e| e.starts_with("myapp-1.2.0/log/")));
    assert!(!entries.iter().any(|e| e.starts_with("myapp-1.2.0/simulation")));
    assert!(!entries.iter().any(|e| e.contains(".svn")));

    // The live workspace is left alone
    assert!(ctx.root().join("log/run.log").exists());
    assert!(!ctx.root().join("vendor").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn test_local_install_and_revert() {
    let ctx = TestContext::new();
    ctx.write_manifest();
    ctx.write_boot_entry();
    ctx.write_config("dependency_manager:\n  program: \"true\"\n");

    ctx.baler()
        .args(["archive", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("baler archive --no-local"));
    assert!(ctx.root().join("vendor/gems").is_dir());
    assert!(ctx.root().join(".baler_archive").exists());

    ctx.baler()
        .args(["archive", "--no-local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("restored"));
    assert!(!ctx.root().join("vendor/gems").exists());
    assert!(!ctx.root().join(".baler_archive").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn test_failing_dependency_manager_cleans_staging() {
    let ctx = TestContext::new();
    ctx.write_manifest();
    ctx.write_boot_entry();
    ctx.write_config(
        "gem_install_dir: /tmp/baler-gems\ndependency_manager:\n  program: \"false\"\n",
    );
    ctx.write_file("src/app.rb", "puts 1");

    ctx.baler()
        .arg("archive")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("packaging the dependencies"));

    assert!(!ctx.root().join("tmp/myapp-1.2.0").exists());
    assert!(!ctx.root().join("tmp/myapp-1.2.0.tar.gz").exists());
}
