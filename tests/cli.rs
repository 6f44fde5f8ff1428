// End-to-end checks of the stride binary against a throwaway data directory

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn stride(data_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stride"));
    cmd.env("STRIDE_DATA_DIR", data_dir.path())
        .env_remove("STRIDE_USER")
        .env_remove("RUST_LOG");
    cmd
}

fn create_fund(data_dir: &TempDir) {
    stride(data_dir)
        .args([
            "goal", "create", "Fund", "1000", "--deadline", "2099-12-31", "--status", "active",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created goal: Fund"));
}

#[test]
fn init_writes_config() {
    let data_dir = TempDir::new().unwrap();

    stride(&data_dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete"));

    assert!(data_dir.path().join("config.json").exists());
    assert!(data_dir.path().join("data").join("goals.json").exists());
}

#[test]
fn progress_updates_percentage() {
    let data_dir = TempDir::new().unwrap();
    create_fund(&data_dir);

    stride(&data_dir)
        .args(["goal", "progress", "Fund", "300"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30.00%"));

    stride(&data_dir)
        .args(["goal", "progress", "fund", "-50", "--description", "fee"])
        .assert()
        .success();

    stride(&data_dir)
        .args(["goal", "show", "Fund"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25.00%"))
        .stdout(predicate::str::contains("fee"));
}

#[test]
fn goals_are_scoped_to_user() {
    let data_dir = TempDir::new().unwrap();
    create_fund(&data_dir);

    stride(&data_dir)
        .args(["--user", "someone-else", "goal", "show", "Fund"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Goal not found"));

    stride(&data_dir)
        .args(["goal", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 1"));
}

#[test]
fn milestone_index_out_of_range() {
    let data_dir = TempDir::new().unwrap();
    create_fund(&data_dir);

    stride(&data_dir)
        .args(["milestone", "add", "Fund", "Half", "500", "--date", "2099-06-30"])
        .assert()
        .success();

    stride(&data_dir)
        .args(["milestone", "edit", "Fund", "5", "--name", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn recalc_requires_auto_tracking() {
    let data_dir = TempDir::new().unwrap();
    create_fund(&data_dir);

    stride(&data_dir)
        .args(["goal", "recalc", "Fund"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Precondition failed"));
}

#[test]
fn auto_tracked_goal_follows_transactions() {
    let data_dir = TempDir::new().unwrap();

    stride(&data_dir)
        .args([
            "goal", "create", "Side hustle", "2000", "--deadline", "2099-12-31", "--type",
            "revenue", "--status", "active", "--auto-track", "--track-category", "freelance",
        ])
        .assert()
        .success();

    stride(&data_dir)
        .args(["txn", "add", "income", "400", "--category", "freelance"])
        .assert()
        .success();
    stride(&data_dir)
        .args(["txn", "add", "income", "999", "--category", "salary"])
        .assert()
        .success();

    stride(&data_dir)
        .args(["goal", "recalc", "Side hustle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$400.00"))
        .stdout(predicate::str::contains("20.00%"));
}

#[test]
fn invalid_status_is_rejected() {
    let data_dir = TempDir::new().unwrap();

    stride(&data_dir)
        .args([
            "goal", "create", "Bad", "100", "--deadline", "2099-01-01", "--status", "archived",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status"));
}

#[test]
fn edit_can_clear_tags_and_merge_tracking() {
    let data_dir = TempDir::new().unwrap();

    stride(&data_dir)
        .args([
            "goal", "create", "Gig", "500", "--deadline", "2099-12-31", "--tag", "side",
            "--auto-track", "--track-category", "freelance",
        ])
        .assert()
        .success();

    stride(&data_dir)
        .args(["goal", "edit", "Gig", "--clear-tags", "--track-source", "acme"])
        .assert()
        .success();

    stride(&data_dir)
        .args(["goal", "show", "Gig", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tags\": []"))
        .stdout(predicate::str::contains("\"freelance\""))
        .stdout(predicate::str::contains("\"acme\""));

    stride(&data_dir)
        .args(["goal", "edit", "Gig", "--clear-tags", "--tag", "x"])
        .assert()
        .failure();
}

#[test]
fn history_lists_goal_changes() {
    let data_dir = TempDir::new().unwrap();
    create_fund(&data_dir);

    stride(&data_dir)
        .args(["goal", "progress", "Fund", "40"])
        .assert()
        .success();

    stride(&data_dir)
        .args(["goal", "history", "Fund"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE"))
        .stdout(predicate::str::contains("Progress"))
        .stdout(predicate::str::contains("current_amount"));
}

#[test]
fn overflowing_amount_is_rejected() {
    let data_dir = TempDir::new().unwrap();

    stride(&data_dir)
        .args([
            "goal", "create", "Huge", "92233720368547759", "--deadline", "2099-12-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}
