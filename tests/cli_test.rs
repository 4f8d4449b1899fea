//! Integration tests for the procgather binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A command isolated from the user's config and store.
fn procgather(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("procgather"));
    cmd.current_dir(temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .env("PROCGATHER_DATA_DIR", temp.path().join("data"))
        .env_remove("PROCGATHER_API_BASE")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("procgather"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("business process steps"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("procgather"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_no_args_lists_processes() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    procgather(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("No processes yet."));
    Ok(())
}

#[test]
fn cli_create_then_list() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    procgather(&temp)
        .args(["create", "Invoice approval"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created process 1 (Invoice approval)"));

    procgather(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice approval"));
    Ok(())
}

#[test]
fn cli_edit_reads_commands_from_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    procgather(&temp)
        .arg("edit")
        .write_stdin(
            "add Receive invoice\n\
             set 1 who AP clerk\n\
             add Approve payment\n\
             next 1 2\n\
             end 2\n\
             save\n\
             quit\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 steps"));

    procgather(&temp)
        .args(["show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"who\": \"AP clerk\""))
        .stdout(predicate::str::contains("\"isEnd\": true"));
    Ok(())
}

#[test]
fn cli_edit_reports_bad_lines() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    procgather(&temp)
        .args(["--yes", "edit"])
        .write_stdin("add\nfly away\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command 'fly'"));
    Ok(())
}

#[test]
fn cli_export_then_import() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    procgather(&temp)
        .args(["--yes", "edit"])
        .write_stdin("rename Payroll run\nadd Collect timesheets\nadd Run payroll\n")
        .assert()
        .success();

    let export = temp.path().join("payroll.apo.json");
    procgather(&temp)
        .args(["export", "--output"])
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 steps"));
    assert!(fs::read_to_string(&export)?.contains("Collect timesheets"));

    procgather(&temp)
        .arg("import")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Payroll run (import)"));

    procgather(&temp)
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Payroll run (import)"));
    Ok(())
}

#[test]
fn cli_export_defaults_to_name_based_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    procgather(&temp)
        .args(["create", "Month end close"])
        .assert()
        .success();
    procgather(&temp).arg("export").assert().success();

    assert!(temp.path().join("Month_end_close.apo.json").exists());
    Ok(())
}

#[test]
fn cli_import_rejects_malformed_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let file = temp.path().join("broken.json");
    fs::write(&file, "{ nope")?;

    procgather(&temp)
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid import document"));
    Ok(())
}

#[test]
fn cli_delete_requires_confirmation() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    procgather(&temp).args(["create", "Keep"]).assert().success();

    procgather(&temp).args(["delete", "1"]).assert().failure();
    procgather(&temp)
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("Keep"));

    procgather(&temp)
        .args(["delete", "1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted process 1"));
    Ok(())
}

#[test]
fn cli_prompt_answer_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    procgather(&temp).args(["create", "Gone"]).assert().success();

    procgather(&temp)
        .env("PROCGATHER_PROMPT_RESET", "yes")
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 processes"));
    Ok(())
}

#[test]
fn cli_attach_stores_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    procgather(&temp)
        .args(["--yes", "edit"])
        .write_stdin("add Receive invoice\nsave\n")
        .assert()
        .success();

    let file = temp.path().join("invoice.pdf");
    fs::write(&file, b"%PDF-1.7")?;
    procgather(&temp)
        .args(["attach", "1"])
        .arg(&file)
        .args(["--type", "input"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attached invoice.pdf (input, 8 B)"));

    procgather(&temp)
        .args(["show", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("application/pdf"));
    Ok(())
}

#[test]
fn cli_rejects_invalid_config() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let config = temp.path().join("config.yml");
    fs::write(&config, "sync:\n  api_base: ftp://example.com\n")?;

    procgather(&temp)
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must start with http"));
    Ok(())
}

#[test]
fn cli_missing_explicit_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    procgather(&temp)
        .args(["--config", "nope.yml", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}
