//! Scenario: `sw` operator CLI.
//!
//! # Invariants under test
//!
//! 1. `config-check` fails fast with `CONFIG_MISSING` naming the variable.
//! 2. A malformed variable is reported as `CONFIG_INVALID` by name.
//! 3. A valid environment prints the summary and never echoes a credential.
//! 4. `render` previews the embed payload without touching the network.
//! 5. `feed` rejects an out-of-range `--limit` before any fetch.
//! 6. `check` resolves the daemon address through the config crate and
//!    needs no credentials to do so.
//!
//! Every invocation starts from a cleared environment.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const TOKEN: &str = "secret-bot-token-value";
const API_KEY: &str = "secret-api-key-value";

fn sw() -> Command {
    let mut cmd = Command::cargo_bin("sw").expect("sw binary not built");
    cmd.env_clear().current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

fn sw_configured() -> Command {
    let mut cmd = sw();
    cmd.env("DISCORD_TOKEN", TOKEN)
        .env("ETSY_API_KEY", API_KEY)
        .env("ETSY_SHOP_ID", "12345")
        .env("CHANNEL_ID", "987654321");
    cmd
}

// ---------------------------------------------------------------------------
// 1 + 2. Fail fast
// ---------------------------------------------------------------------------

#[test]
fn config_check_names_missing_variable() {
    sw().arg("config-check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_MISSING"))
        .stderr(predicate::str::contains("DISCORD_TOKEN"));
}

#[test]
fn config_check_names_invalid_variable() {
    sw_configured()
        .env("CHANNEL_ID", "general")
        .arg("config-check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_INVALID"))
        .stderr(predicate::str::contains("CHANNEL_ID"))
        .stderr(predicate::str::contains("general").not());
}

// ---------------------------------------------------------------------------
// 3. Summary is credential-free
// ---------------------------------------------------------------------------

#[test]
fn config_check_prints_summary_without_credentials() {
    sw_configured()
        .arg("config-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"shop_id\": \"12345\""))
        .stdout(predicate::str::contains("\"channel_id\": 987654321"))
        .stdout(predicate::str::contains("\"poll_interval_secs\": 300"))
        .stdout(predicate::str::contains(TOKEN).not())
        .stdout(predicate::str::contains(API_KEY).not());
}

// ---------------------------------------------------------------------------
// 4. render
// ---------------------------------------------------------------------------

#[test]
fn render_previews_sample_order_without_config() {
    sw().arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("New Etsy Order!"))
        .stdout(predicate::str::contains("\"4550/100\""))
        .stdout(predicate::str::contains("\"inline\": true"));
}

#[test]
fn render_reads_receipt_record_from_file() {
    let path = std::env::temp_dir().join(format!("sw-render-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"receipt_id": 777, "create_timestamp": 1700000000,
            "grandtotal": {"amount": 1999, "divisor": 100, "currency_code": "USD"},
            "name": null, "status": "Completed", "unrelated": true}"#,
    )
    .unwrap();

    sw().arg("render")
        .arg("--order-file")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"777\""))
        .stdout(predicate::str::contains("\"1999/100\""))
        .stdout(predicate::str::contains("\"N/A\""))
        .stdout(predicate::str::contains("Completed"));

    let _ = std::fs::remove_file(&path);
}

// ---------------------------------------------------------------------------
// 5. feed argument validation
// ---------------------------------------------------------------------------

#[test]
fn feed_rejects_out_of_range_limit() {
    sw_configured()
        .args(["feed", "--limit", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --limit 0"));
}

// ---------------------------------------------------------------------------
// 6. check address resolution
// ---------------------------------------------------------------------------

#[test]
fn check_rejects_invalid_daemon_addr_without_credentials() {
    sw().env("SW_DAEMON_ADDR", "not-an-addr")
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_INVALID"))
        .stderr(predicate::str::contains("SW_DAEMON_ADDR"))
        .stderr(predicate::str::contains("CONFIG_MISSING").not());
}
