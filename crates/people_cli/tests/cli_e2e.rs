//! End-to-end tests for the `people` binary against a file-backed store.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn people_cmd(store: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("people").unwrap();
    cmd.current_dir(store.path())
        .env("STORE_URI", format!("file://{}", store.path().display()))
        .env("DB_NAME", "crm")
        .env("COLLECTION_NAME", "people")
        .env("PEOPLE_LOG_LEVEL", "off")
        .env_remove("PEOPLE_LOG_DIR");
    cmd
}

fn create(store: &TempDir, name: &str, email: &str) -> String {
    let output = people_cmd(store)
        .args(["create", "--name", name, "--email", email])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Created person with id: "))
        .expect("create should print the new id")
        .trim()
        .to_string()
}

#[test]
fn list_on_empty_store_reports_no_records() {
    let store = TempDir::new().unwrap();
    people_cmd(&store)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexes ensured."))
        .stdout(predicate::str::contains("No records found."));
}

#[test]
fn create_then_get_prints_record() {
    let store = TempDir::new().unwrap();
    let id = create(&store, "Ann", "ann@x.com");

    people_cmd(&store)
        .args(["get", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("ann@x.com"))
        .stdout(predicate::str::contains(id.as_str()));
}

#[test]
fn get_unknown_id_exits_with_failure() {
    let store = TempDir::new().unwrap();
    people_cmd(&store)
        .args(["get", "not-an-id"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Not found"));
}

#[test]
fn update_without_fields_exits_with_failure() {
    let store = TempDir::new().unwrap();
    let id = create(&store, "Ann", "ann@x.com");

    people_cmd(&store)
        .args(["update", &id])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No updates specified"));
}

#[test]
fn update_then_list_shows_new_value() {
    let store = TempDir::new().unwrap();
    let id = create(&store, "Ann", "ann@x.com");

    people_cmd(&store)
        .args(["update", &id, "--age", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Update succeeded"));

    people_cmd(&store)
        .args(["list", "--search", "ANN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ann"))
        .stdout(predicate::str::contains("5"));
}

#[test]
fn missing_configuration_is_fatal() {
    let store = TempDir::new().unwrap();
    people_cmd(&store)
        .env_remove("STORE_URI")
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("STORE_URI"));
}

#[test]
fn missing_store_directory_is_fatal() {
    let store = TempDir::new().unwrap();
    people_cmd(&store)
        .env("STORE_URI", store.path().join("nowhere").display().to_string())
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unreachable"));
}

#[test]
fn piped_no_declines_delete() {
    let store = TempDir::new().unwrap();
    let id = create(&store, "Ann", "ann@x.com");

    people_cmd(&store)
        .args(["delete", &id])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delete cancelled"));

    people_cmd(&store).args(["get", &id]).assert().success();
}

#[test]
fn piped_yes_confirms_delete() {
    let store = TempDir::new().unwrap();
    let id = create(&store, "Ann", "ann@x.com");

    people_cmd(&store)
        .args(["delete", &id])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    people_cmd(&store)
        .args(["get", &id])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Not found"));
}

#[test]
fn create_accepts_negative_age() {
    let store = TempDir::new().unwrap();
    let output = people_cmd(&store)
        .args(["create", "--name", "Neg", "--email", "n@x.com", "--age", "-3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    people_cmd(&store)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("-3"));
}

#[test]
fn default_stderr_logging_stays_quiet() {
    let store = TempDir::new().unwrap();
    people_cmd(&store)
        .env_remove("PEOPLE_LOG_LEVEL")
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn blank_log_level_uses_default() {
    let store = TempDir::new().unwrap();
    people_cmd(&store)
        .env("PEOPLE_LOG_LEVEL", "")
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning").not());
}
