use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

fn cmd() -> Command {
    cargo_bin_cmd!("ts-acl-hosts-gen")
}

#[test]
fn help_lists_every_flag() {
    let assert = cmd().arg("--help").assert().success();
    let out = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    for flag in [
        "--json",
        "--verbose",
        "--api-key",
        "--oauth-id",
        "--oauth-secret",
        "--tailnet",
        "--api-url",
        "<POLICY>",
        "TS_API_KEY",
        "TS_OAUTH_ID",
        "TS_OAUTH_SECRET",
    ] {
        assert!(out.contains(flag), "help is missing {flag}:\n{out}");
    }
}

#[test]
fn help_hides_secret_values() {
    cmd()
        .env("TS_API_KEY", "tskey-very-secret")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("tskey-very-secret").not());
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_policy_argument_is_a_usage_error() {
    cmd()
        .env_remove("TS_API_KEY")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("<POLICY>"))
        .stderr(contains("Usage:"));
}
