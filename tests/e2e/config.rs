use super::*;

#[test]
fn test_config_show_defaults() {
    let ctx = TestContext::new();

    ctx.baler()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("archive_extension: tar.gz"))
        .stdout(predicate::str::contains("vendor_dir: vendor/gems"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_set_gem_dir_persists() {
    let ctx = TestContext::new();

    ctx.baler()
        .args(["config", "set-gem-dir", "/opt/gems"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/opt/gems"));

    ctx.temp
        .child("config/baler/config.yaml")
        .assert(predicate::str::contains("gem_install_dir: /opt/gems"));

    ctx.baler()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gem_install_dir: /opt/gems"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_invalid_config_is_reported() {
    let ctx = TestContext::new();
    ctx.write_config("exclude: [unterminated\n");

    ctx.baler()
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
