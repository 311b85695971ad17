use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn spendlens(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("spendlens").unwrap();
    cmd.env("SPENDLENS_DATA_DIR", dir).env_remove("SPENDLENS_LOG");
    cmd
}

/// Eight small "fun" expenses and one large one, all in March 2025
fn write_fun_csv(dir: &Path) -> std::path::PathBuf {
    let mut csv = String::from("amount,category,payment_method,date,note\n");
    for day in 1..=8 {
        csv.push_str(&format!("20,fun,card,2025-03-{:02},\n", day));
    }
    csv.push_str("300,fun,card,2025-03-20,concert\n");
    let path = dir.join("fun.csv");
    fs::write(&path, csv).unwrap();
    path
}

#[test]
fn test_init_creates_data_files() {
    let dir = TempDir::new().unwrap();

    spendlens(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("expenses.json").exists());

    spendlens(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));
}

#[test]
fn test_add_and_list_expenses() {
    let dir = TempDir::new().unwrap();

    spendlens(dir.path())
        .args(["expense", "add", "12.50", "coffee", "--date", "2025-04-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created expense:"));

    spendlens(dir.path())
        .args(["expense", "list", "--category", "coffee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("coffee"))
        .stdout(predicate::str::contains("12.50"));
}

#[test]
fn test_add_rejects_non_positive_amount() {
    let dir = TempDir::new().unwrap();

    spendlens(dir.path())
        .args(["expense", "add", "0", "coffee"])
        .assert()
        .failure();
}

#[test]
fn test_import_requires_all_columns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "amount,category\n10,food\n").unwrap();

    spendlens(dir.path())
        .args(["expense", "import"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("payment_method"))
        .stderr(predicate::str::contains("date"));
}

#[test]
fn test_anomaly_report_flags_spike() {
    let dir = TempDir::new().unwrap();
    let csv = write_fun_csv(dir.path());

    spendlens(dir.path())
        .args(["expense", "import"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 9 expense(s)"));

    spendlens(dir.path())
        .args(["report", "anomalies", "--window", "90"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MEDIUM"))
        .stdout(predicate::str::contains("300.00 $"));

    let out = dir.path().join("alerts.csv");
    spendlens(dir.path())
        .args(["report", "anomalies", "--output"])
        .arg(&out)
        .assert()
        .success();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("category,date,amount,level\n"));
    assert!(text.contains("fun,2025-03-20,300.00,medium"));
}

#[test]
fn test_optimize_report() {
    let dir = TempDir::new().unwrap();
    let csv = write_fun_csv(dir.path());
    spendlens(dir.path())
        .args(["expense", "import"])
        .arg(&csv)
        .assert()
        .success();

    spendlens(dir.path())
        .args([
            "report", "optimize", "--income", "1500", "--savings", "500", "--baseline", "average",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("optimal"))
        .stdout(predicate::str::contains("460.00 $"));

    spendlens(dir.path())
        .args([
            "report", "optimize", "--income", "1500", "--savings", "500", "--fixed", "fun=2000",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("no optimal allocation"));
}

#[test]
fn test_export_then_reimport() {
    let source = TempDir::new().unwrap();
    let csv = write_fun_csv(source.path());
    spendlens(source.path())
        .args(["expense", "import"])
        .arg(&csv)
        .assert()
        .success();

    let exported = source.path().join("export.csv");
    spendlens(source.path())
        .args(["expense", "export"])
        .arg(&exported)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 9 expense(s)"));

    let target = TempDir::new().unwrap();
    spendlens(target.path())
        .args(["expense", "import"])
        .arg(&exported)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 9 expense(s)"));
}
