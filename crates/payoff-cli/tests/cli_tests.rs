use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const LOANS: &str = r#"[
    {"id": "B", "balance": "1000", "annual_rate_percent": "5", "type": "Unsubsidized"},
    {"id": "A", "balance": "1000", "annual_rate_percent": "10", "type": "Grad PLUS"},
    {"id": "Z", "balance": "0", "annual_rate_percent": "3.73", "type": "Subsidized", "status": "Paid Off"}
]"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn payoff() -> Command {
    let mut cmd = Command::cargo_bin("payoff").unwrap();
    cmd.env_remove("PAYOFF_CONFIG").env_remove("RUST_LOG");
    cmd
}

// ===========================================================================
// Loan snapshot commands
// ===========================================================================

#[test]
fn test_version() {
    payoff()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("payoff "));
}

#[test]
fn test_order_minimal_lists_ids() {
    let loans = write_temp(LOANS);
    payoff()
        .args(["order", "--output", "minimal", "--loans"])
        .arg(loans.path())
        .assert()
        .success()
        .stdout("A\nB\n");
}

#[test]
fn test_portfolio_from_stdin() {
    payoff()
        .args(["portfolio"])
        .write_stdin(format!(r#"{{"loans": {LOANS}}}"#))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"active_loans\": 2"))
        .stdout(predicate::str::contains("\"total_monthly_interest\": \"12.50\""));
}

#[test]
fn test_missing_input_fails() {
    payoff()
        .arg("order")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_invalid_loan_reports_field() {
    let loans = write_temp(
        r#"[{"id": "X", "balance": "10", "annual_rate_percent": "-1", "type": "Unsubsidized"}]"#,
    );
    payoff()
        .args(["portfolio", "--loans"])
        .arg(loans.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("annual_rate_percent"));
}

// ===========================================================================
// Schedule, summary and comparison
// ===========================================================================

#[test]
fn test_summary_minimal_months() {
    let loans = write_temp(
        r#"[{"id": "L", "balance": "1000", "annual_rate_percent": "12", "type": "Grad PLUS"}]"#,
    );
    payoff()
        .args(["summary", "--output", "minimal", "--monthly-payment", "600"])
        .args(["--start-date", "2026-04-01", "--loans"])
        .arg(loans.path())
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_schedule_flag_overrides_input_payment() {
    let input = write_temp(
        r#"{
            "loans": [{"id": "L", "balance": "1000", "annual_rate_percent": "12", "type": "Grad PLUS"}],
            "monthly_payment": "50",
            "start_date": "2026-04-01"
        }"#,
    );
    payoff()
        .args(["schedule", "--monthly-payment", "600", "--input"])
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"payment_made\": \"414.10\""))
        .stdout(predicate::str::contains("\"date\": \"2026-05-01\""));
}

#[test]
fn test_schedule_csv_has_row_per_period() {
    let loans = write_temp(LOANS);
    let out = payoff()
        .args(["schedule", "--output", "csv", "--monthly-payment", "1200"])
        .args(["--start-date", "2026-04-01", "--loans"])
        .arg(loans.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert!(header.contains(&"period"));
    assert!(header.contains(&"payment_made"));
    // 2000 at ~7.5% with 1200/month clears in two periods
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_schedule_requires_payment_with_loans() {
    let loans = write_temp(LOANS);
    payoff()
        .args(["schedule", "--loans"])
        .arg(loans.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--monthly-payment"));
}

#[test]
fn test_compare_names_cheapest() {
    let loans = write_temp(LOANS);
    payoff()
        .args(["compare", "--output", "minimal", "--payments", "100,500,1000"])
        .args(["--labels", "Minimum,Plan,Aggressive", "--start-date", "2026-04-01"])
        .arg("--loans")
        .arg(loans.path())
        .assert()
        .success()
        .stdout("Aggressive\n");
}

#[test]
fn test_compare_flags_override_input_scenarios() {
    let input = write_temp(&format!(
        r#"{{"loans": {LOANS}, "scenarios": [{{"label": "Doc", "monthly_payment": "100"}}], "start_date": "2026-04-01"}}"#
    ));
    payoff()
        .args(["compare", "--payments", "200,900", "--labels", "Slow,Fast", "--input"])
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"baseline\": \"Slow\""))
        .stdout(predicate::str::contains("\"cheapest\": \"Fast\""))
        .stdout(predicate::str::contains("Doc").not());
}

#[test]
fn test_compare_ladder_from_budget() {
    let loans = write_temp(LOANS);
    let budget = write_temp(
        r#"{"gross_annual_salary": "95000", "tax_rate_percent": "28",
            "expenses": [{"name": "Rent", "amount": "2730"}],
            "minimum_loan_payment": "850", "extra_debt_percent": "60"}"#,
    );
    payoff()
        .args(["compare", "--start-date", "2026-04-01", "--custom-payment", "1800"])
        .arg("--budget")
        .arg(budget.path())
        .arg("--loans")
        .arg(loans.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"baseline\": \"Minimum Only\""))
        .stdout(predicate::str::contains("\"label\": \"Current Plan\""))
        .stdout(predicate::str::contains("\"monthly_payment\": \"2632\""))
        .stdout(predicate::str::contains("\"label\": \"Custom\""));
}

#[test]
fn test_compare_requires_payments_or_budget_with_loans() {
    let loans = write_temp(LOANS);
    payoff()
        .args(["compare", "--loans"])
        .arg(loans.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--budget"));
}

// ===========================================================================
// Allocation, advice and budget
// ===========================================================================

#[test]
fn test_allocate_csv_lines() {
    let loans = write_temp(LOANS);
    payoff()
        .args(["allocate", "--output", "csv", "--amount", "500", "--loans"])
        .arg(loans.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("loan_id"))
        .stdout(predicate::str::contains("Grad PLUS"))
        .stdout(predicate::str::contains("Unsubsidized"));
}

#[test]
fn test_advise_uses_config_buffer() {
    let loans = write_temp(LOANS);
    let config = write_temp("baseline_buffer: 100\nstart_date: 2026-04-01\n");
    payoff()
        .args(["advise", "--amount", "700", "--loans"])
        .arg(loans.path())
        .env("PAYOFF_CONFIG", config.path())
        .assert()
        .success()
        // 12.50 interest + 100 buffer
        .stdout(predicate::str::contains("\"baseline_payment\": \"112.50\""));
}

#[test]
fn test_advise_interest_since_last_payment() {
    let loans = write_temp(LOANS);
    payoff()
        .args(["advise", "--amount", "700", "--start-date", "2026-04-01"])
        .args(["--last-payment-date", "2026-03-01", "--as-of-date", "2026-03-31"])
        .arg("--loans")
        .arg(loans.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"days_since_last_payment\": 30"))
        // 150 / 365 per day over 30 days
        .stdout(predicate::str::contains("\"interest_since_last_payment\": \"12.33\""));
}

#[test]
fn test_capacity_from_flags() {
    payoff()
        .args(["capacity", "--output", "minimal", "--salary", "95000", "--tax-rate", "28"])
        .args(["--expenses", "Rent=1800", "--minimum-payment", "850"])
        .args(["--extra-percent", "60"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("3190"));
}

#[test]
fn test_config_sets_default_output() {
    let loans = write_temp(LOANS);
    let config = write_temp("output: minimal\n");
    payoff()
        .args(["order", "--config"])
        .arg(config.path())
        .arg("--loans")
        .arg(loans.path())
        .assert()
        .success()
        .stdout("A\nB\n");
}

#[test]
fn test_bad_config_fails() {
    let config = write_temp("output: [nope\n");
    payoff()
        .args(["version", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}
