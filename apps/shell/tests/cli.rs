use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn stackline() -> Command {
    let mut cmd = Command::cargo_bin("stackline").expect("stackline binary should be built");
    cmd.env("STACKLINE__LOGGING__LEVEL", "off");
    cmd
}

#[test]
fn split_leaves_both_stacks_writable() {
    stackline()
        .args(["split", "--frames", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("at worker"))
        .stdout(predicate::str::contains("at caller keeps going"))
        .stdout(predicate::str::contains("at [usize] 1"));
}

#[test]
fn migrate_locks_the_caller() {
    stackline()
        .args(["migrate", "--frames", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("popped [usize] 1"))
        .stdout(predicate::str::contains("locked"))
        .stdout(predicate::str::contains("caller push rejected: true"));
}

#[test]
fn fanout_runs_every_task_on_a_runtime_executor() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("stackline.toml");
    fs::write(
        &config,
        "[executor]\nkind = \"runtime\"\npreset = \"single_thread\"\nthread_name = \"frames-rt\"\n",
    )?;

    stackline()
        .arg("--config")
        .arg(&config)
        .args(["fanout", "--tasks", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("task 2 on frames-rt"))
        .stdout(predicate::str::contains("at [usize] 2"))
        .stdout(predicate::str::contains("at fanout"));
    Ok(())
}

#[test]
fn missing_config_file_fails() {
    stackline()
        .args(["--config", "no/such/stackline.toml", "fanout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to build config"));
}

#[test]
fn environment_overrides_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("stackline.toml");
    fs::write(&config, "[executor]\nthread_name = \"filepool\"\n")?;

    stackline()
        .env("STACKLINE__EXECUTOR__THREAD_NAME", "envpool")
        .arg("--config")
        .arg(&config)
        .args(["fanout", "--tasks", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("task 0 on envpool"))
        .stdout(predicate::str::contains("filepool").not());
    Ok(())
}

#[test]
fn environment_sets_executor_without_file() {
    stackline()
        .env("STACKLINE__EXECUTOR__KIND", "runtime")
        .env("STACKLINE__EXECUTOR__THREAD_NAME", "env-runtime")
        .args(["fanout", "--tasks", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("task 1 on env-runtime"));
}

#[test]
fn log_level_override_controls_console_output() {
    stackline()
        .args(["fanout", "--tasks", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Caller stack untouched").not());

    stackline()
        .env("STACKLINE__LOGGING__LEVEL", "info")
        .args(["fanout", "--tasks", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Caller stack untouched"));
}
