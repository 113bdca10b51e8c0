use assert_cmd::Command;
use predicates::prelude::*;

fn rankscope() -> Command {
    let mut cmd = Command::cargo_bin("rankscope").unwrap();
    cmd.env_remove("RANKSCOPE_TOKEN");
    cmd
}

#[test]
fn test_presets_lists_the_fixed_vocabulary() {
    rankscope()
        .arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("last_28d_vs_previous"))
        .stdout(predicate::str::contains("last_7d_vs_year_ago"))
        .stdout(predicate::str::contains("custom"));
}

#[test]
fn test_presets_json_derives_contiguous_windows() {
    rankscope()
        .args(["presets", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"primary\""))
        .stdout(predicate::str::contains("\"comparison\""));
}

#[test]
fn test_limit_is_accepted_by_every_view() {
    // The flag is shared; commands that reach the credential check have
    // parsed it successfully.
    for view in ["overview", "table", "chart"] {
        rankscope()
            .args([view, "--site", "sc-domain:example.com", "--limit", "5"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("RANKSCOPE_TOKEN"));
    }
}

#[test]
fn test_missing_credential_is_an_error() {
    rankscope()
        .args(["table", "--site", "sc-domain:example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("RANKSCOPE_TOKEN"));
}

#[test]
fn test_custom_preset_requires_explicit_dates() {
    rankscope()
        .args([
            "overview",
            "--site",
            "sc-domain:example.com",
            "--token",
            "t",
            "--preset",
            "custom",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--start is required"));
}

#[test]
fn test_invalid_date_is_rejected() {
    rankscope()
        .args([
            "chart",
            "--site",
            "sc-domain:example.com",
            "--token",
            "t",
            "--preset",
            "custom",
            "--start",
            "June 1st",
            "--end",
            "2025-06-28",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_future_end_date_blocks_the_view() {
    rankscope()
        .args([
            "chart",
            "--site",
            "sc-domain:example.com",
            "--token",
            "t",
            "--preset",
            "custom",
            "--start",
            "2099-01-01",
            "--end",
            "2099-01-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no future data"));
}

#[test]
fn test_unknown_grouping_is_rejected() {
    rankscope()
        .args([
            "table",
            "--site",
            "sc-domain:example.com",
            "--token",
            "t",
            "--by",
            "country-code",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("query or page"));
}
