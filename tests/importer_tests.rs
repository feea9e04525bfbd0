// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneyplan::models::{AssetGroup, RecordLines, RecordRequest};
use moneyplan::{cli, commands::importer, db, plan, records};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

const HEADER: &str = "section,group,name,amount,rate,note,category_id";

fn csv_file(rows: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}\n{}", HEADER, rows).unwrap();
    file.flush().unwrap();
    file
}

fn run_import(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["moneyplan", "import"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(conn, import_m)
    } else {
        panic!("no import subcommand");
    }
}

fn import_record(conn: &mut Connection, path: &str) -> anyhow::Result<()> {
    run_import(
        conn,
        &["record", "--year", "2026", "--month", "3", "--path", path],
    )
}

#[test]
fn importer_fills_every_section() {
    let mut conn = db::open_in_memory().unwrap();
    let file = csv_file(
        "asset,liquid,Cash,1200.50,,,\n\
         asset,INVESTMENT,Index fund,8000,5.5,,\n\
         liability,,Mortgage,90000,3.9,,\n\
         income,,Salary,6000,,,\n\
         expense,,Rent,2500,,March rent,\n\
         expense,,Groceries,800.25,,,",
    );
    let path = file.path().to_str().unwrap().to_string();
    import_record(&mut conn, &format!("  {}  ", path)).unwrap();

    let r = records::get_record(&conn, 2026, 3).unwrap();
    assert_eq!(r.asset_details.len(), 2);
    assert_eq!(r.asset_details[1].group, AssetGroup::Investment);
    assert_eq!(r.asset_details[1].return_rate, Some(dec!(5.5)));
    assert_eq!(r.asset_details[1].sort_order, 1);
    assert_eq!(r.liability_details[0].interest_rate, Some(dec!(3.9)));
    assert_eq!(r.expense_details[0].detail.as_deref(), Some("March rent"));
    assert_eq!(r.expense_details[1].sort_order, 1);
    assert_eq!(r.total_asset, dec!(9200.50));
    assert_eq!(r.total_expense, dec!(3300.25));
    assert_eq!(r.surplus().unwrap(), dec!(2699.75));
}

#[test]
fn importer_skips_rows_without_a_name() {
    let mut conn = db::open_in_memory().unwrap();
    let file = csv_file("asset,liquid,,abc,,,\nincome,,Salary,10,,,");
    let path = file.path().to_str().unwrap().to_string();
    import_record(&mut conn, &path).unwrap();

    let r = records::get_record(&conn, 2026, 3).unwrap();
    assert!(r.asset_details.is_empty());
    assert_eq!(r.total_income, dec!(10));
}

#[test]
fn importer_links_known_categories_only() {
    let mut conn = db::open_in_memory().unwrap();
    let p = plan::create_or_update_plan(
        &mut conn,
        &serde_json::from_str(
            r#"{"year": 2026, "annual_expenses": [
                {"parent_group": "LEISURE", "category": "Travel", "budget_amount": "2000", "is_monthly": false}
            ]}"#,
        )
        .unwrap(),
    )
    .unwrap();
    let travel = p.annual_expenses[0].id.unwrap();

    let file = csv_file(&format!(
        "expense,,Flights,450,,,{}\nexpense,,Mystery,10,,,777",
        travel
    ));
    let path = file.path().to_str().unwrap().to_string();
    import_record(&mut conn, &path).unwrap();

    let r = records::get_record(&conn, 2026, 3).unwrap();
    assert_eq!(r.expense_details[0].annual_expense_id, Some(travel));
    assert_eq!(r.expense_details[1].annual_expense_id, None);
    let p = plan::get_plan(&conn, 2026).unwrap();
    assert_eq!(p.annual_expenses[0].spent_amount, dec!(450));
}

#[test]
fn importer_replaces_an_existing_month_without_carrying_forward() {
    let mut conn = db::open_in_memory().unwrap();
    let feb = csv_file("asset,liquid,Cash,10,,,\nasset,liquid,Wallet,5,,,");
    let feb_path = feb.path().to_str().unwrap().to_string();
    run_import(
        &mut conn,
        &["record", "--year", "2026", "--month", "2", "--path", &feb_path],
    )
    .unwrap();

    records::create_record(
        &mut conn,
        &RecordRequest {
            year: 2026,
            month: 3,
            summary: Some("kept".into()),
            lines: RecordLines::default(),
        },
    )
    .unwrap();
    assert_eq!(records::get_record(&conn, 2026, 3).unwrap().asset_details.len(), 2);

    let file = csv_file("income,,Salary,100,,,");
    let path = file.path().to_str().unwrap().to_string();
    import_record(&mut conn, &path).unwrap();

    let r = records::get_record(&conn, 2026, 3).unwrap();
    assert!(r.asset_details.is_empty());
    assert_eq!(r.total_asset, Decimal::ZERO);
    assert_eq!(r.total_income, dec!(100));
    assert_eq!(r.summary.as_deref(), Some("kept"));
}

#[test]
fn importer_rejects_invalid_amount() {
    let mut conn = db::open_in_memory().unwrap();
    let file = csv_file("asset,liquid,Cash,10,,,\nexpense,,Shop,abc,,,");
    let path = file.path().to_str().unwrap().to_string();
    let err = import_record(&mut conn, &path).unwrap_err();
    assert!(err.to_string().contains("Invalid amount 'abc' for Shop (line 3)"));
    assert!(records::get_record(&conn, 2026, 3).unwrap_err().is_not_found());
}

#[test]
fn importer_rejects_unknown_section_and_group() {
    let mut conn = db::open_in_memory().unwrap();
    let file = csv_file("transfer,,Move,10,,,");
    let path = file.path().to_str().unwrap().to_string();
    let err = import_record(&mut conn, &path).unwrap_err();
    assert!(err.to_string().contains("Unknown section 'transfer'"));

    let file = csv_file("asset,crypto,Coins,10,,,");
    let path = file.path().to_str().unwrap().to_string();
    let err = import_record(&mut conn, &path).unwrap_err();
    assert!(err.to_string().contains("Invalid asset group 'crypto' for Coins"));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM monthly_records", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn importer_reads_plan_json() {
    let mut conn = db::open_in_memory().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "year": 2026,
            "annual_incomes": [
                {{"income_type": "SALARY", "name": "Salary", "amount": "2.5", "is_monthly": true}},
                {{"income_type": "BONUS", "name": "Bonus", "amount": "6", "is_monthly": false}}
            ],
            "annual_expenses": [
                {{"parent_group": "DAILY", "category": "Food", "budget_amount": "1"}}
            ]
        }}"#
    )
    .unwrap();
    file.flush().unwrap();
    let path = file.path().to_str().unwrap().to_string();
    run_import(&mut conn, &["plan", "--path", &path]).unwrap();

    let p = plan::get_plan(&conn, 2026).unwrap();
    assert_eq!(p.monthly_surplus, dec!(1.5));
    assert_eq!(p.annual_surplus, dec!(24));
    assert!(p.annual_expenses[0].is_monthly);
}
