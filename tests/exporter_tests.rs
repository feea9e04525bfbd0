// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneyplan::models::{
    AnnualExpenseInput, AssetDetailInput, AssetGroup, ExpenseDetailInput, ExpenseGroup,
    IncomeDetailInput, LiabilityDetailInput, PlanRequest, RecordLines, RecordRequest,
};
use moneyplan::{cli, commands::exporter, commands::importer, db, plan, records};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use serde_json::json;
use tempfile::tempdir;

fn seeded() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    records::create_record(
        &mut conn,
        &RecordRequest {
            year: 2026,
            month: 1,
            summary: None,
            lines: RecordLines {
                asset_details: Some(vec![AssetDetailInput {
                    group: Some(AssetGroup::Liquid),
                    name: "Cash".into(),
                    amount: Some(dec!(150.25)),
                    ..Default::default()
                }]),
                income_details: Some(vec![IncomeDetailInput {
                    name: "Salary".into(),
                    amount: Some(dec!(40)),
                    sort_order: None,
                }]),
                ..Default::default()
            },
        },
    )
    .unwrap();
    conn
}

fn run_export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["moneyplan", "export"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_records_writes_pretty_json() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("records.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(
        &conn,
        &["records", "--year", "2026", "--format", "json", "--out", &out_str],
    )
    .unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "year": 2026,
                "month": 1,
                "total_asset": "150.25",
                "total_liability": "0",
                "net_worth": "150.25",
                "total_income": "40",
                "total_expense": "0",
                "surplus": "40"
            }
        ])
    );
}

#[test]
fn export_records_writes_csv_with_header() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("records.csv");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&conn, &["records", "--year", "2026", "--out", &out_str]).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("year,month,total_asset,total_liability,net_worth,total_income,total_expense,surplus")
    );
    assert_eq!(lines.next(), Some("2026,1,150.25,0,150.25,40,0,40"));
    assert_eq!(lines.next(), None);
}

#[test]
fn export_records_rejects_unknown_format() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("records.xml");
    let out_str = out_path.to_string_lossy().to_string();

    let err = run_export(
        &conn,
        &["records", "--year", "2026", "--format", "xml", "--out", &out_str],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Unknown format: xml"));
    assert!(!out_path.exists());
}

#[test]
fn exported_plan_imports_into_a_fresh_database() {
    let mut conn = db::open_in_memory().unwrap();
    let req: PlanRequest = serde_json::from_value(json!({
        "year": 2026,
        "asset_targets": [
            {"group": "INVESTMENT", "name": "Index", "target_amount": "30000", "expected_return_rate": "6"}
        ],
        "annual_incomes": [
            {"income_type": "SALARY", "name": "Salary", "amount": "8000", "is_monthly": true},
            {"income_type": "DIVIDEND", "name": "Dividends", "amount": "1200", "is_monthly": false}
        ],
        "annual_expenses": [
            {"parent_group": "PROTECTION", "category": "Insurance", "budget_amount": "3600", "is_monthly": false, "sort_order": 1},
            {"parent_group": "DAILY", "category": "Food", "budget_amount": "2000", "is_monthly": true, "sort_order": 0}
        ]
    }))
    .unwrap();
    let original = plan::create_or_update_plan(&mut conn, &req).unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("plan.json");
    let out_str = out_path.to_string_lossy().to_string();
    run_export(&conn, &["plan", "--year", "2026", "--out", &out_str]).unwrap();

    let mut fresh = db::open_in_memory().unwrap();
    let matches =
        cli::build_cli().get_matches_from(["moneyplan", "import", "plan", "--path", &out_str]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(&mut fresh, import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }

    let copy = plan::get_plan(&fresh, 2026).unwrap();
    assert_eq!(copy.monthly_surplus, original.monthly_surplus);
    // (8000 - 2000) * 12 + 1200 - 3600
    assert_eq!(copy.annual_surplus, dec!(69600));
    let names: Vec<_> = copy.annual_expenses.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["Food", "Insurance"]);
    assert_eq!(copy.asset_targets[0].expected_return_rate, Some(dec!(6)));
}

#[test]
fn export_plan_of_unknown_year_fails() {
    let conn = db::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("plan.json");
    let out_str = out_path.to_string_lossy().to_string();
    assert!(run_export(&conn, &["plan", "--year", "2031", "--out", &out_str]).is_err());
    assert!(!out_path.exists());
}

#[test]
fn exported_record_imports_back_line_for_line() {
    let mut conn = db::open_in_memory().unwrap();
    let p = plan::create_or_update_plan(
        &mut conn,
        &PlanRequest {
            year: 2026,
            annual_expenses: Some(vec![AnnualExpenseInput {
                parent_group: Some(ExpenseGroup::Leisure),
                category: "Travel".into(),
                budget_amount: Some(dec!(3000)),
                is_monthly: Some(false),
                sort_order: None,
            }]),
            ..Default::default()
        },
    )
    .unwrap();
    let travel = p.annual_expenses[0].id.unwrap();
    let original = records::create_record(
        &mut conn,
        &RecordRequest {
            year: 2026,
            month: 4,
            summary: None,
            lines: RecordLines {
                asset_details: Some(vec![
                    AssetDetailInput {
                        group: Some(AssetGroup::Liquid),
                        name: "Cash".into(),
                        amount: Some(dec!(1200.50)),
                        ..Default::default()
                    },
                    AssetDetailInput {
                        group: Some(AssetGroup::Investment),
                        name: "Index, global".into(),
                        amount: Some(dec!(8000)),
                        return_rate: Some(dec!(5.5)),
                        sort_order: None,
                    },
                ]),
                liability_details: Some(vec![LiabilityDetailInput {
                    name: "Mortgage".into(),
                    amount: Some(dec!(90000)),
                    interest_rate: Some(dec!(3.9)),
                    sort_order: None,
                }]),
                income_details: Some(vec![IncomeDetailInput {
                    name: "Salary".into(),
                    amount: Some(dec!(6000)),
                    sort_order: None,
                }]),
                expense_details: Some(vec![
                    ExpenseDetailInput {
                        annual_expense_id: Some(travel),
                        name: "Flights".into(),
                        amount: Some(dec!(450)),
                        detail: Some("Lisbon, May".into()),
                        sort_order: Some(0),
                    },
                    ExpenseDetailInput {
                        name: "Groceries".into(),
                        amount: Some(dec!(800.25)),
                        sort_order: Some(1),
                        ..Default::default()
                    },
                ]),
            },
        },
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("2026-04.csv");
    let out_str = out_path.to_string_lossy().to_string();
    run_export(
        &conn,
        &["record", "--year", "2026", "--month", "4", "--out", &out_str],
    )
    .unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("section,group,name,amount,rate,note,category_id"));
    assert_eq!(lines.next(), Some("asset,LIQUID,Cash,1200.50,,,"));

    let matches = cli::build_cli().get_matches_from([
        "moneyplan", "import", "record", "--year", "2026", "--month", "5", "--path", &out_str,
    ]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(&mut conn, import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }

    let copy = records::get_record(&conn, 2026, 5).unwrap();
    assert_eq!(copy.asset_details.len(), 2);
    assert_eq!(copy.asset_details[1].name, "Index, global");
    assert_eq!(copy.asset_details[1].group, AssetGroup::Investment);
    assert_eq!(copy.asset_details[1].return_rate, Some(dec!(5.5)));
    assert_eq!(copy.liability_details[0].interest_rate, Some(dec!(3.9)));
    assert_eq!(copy.expense_details[0].annual_expense_id, Some(travel));
    assert_eq!(copy.expense_details[0].detail.as_deref(), Some("Lisbon, May"));
    assert_eq!(copy.expense_details[1].annual_expense_id, None);
    assert_eq!(copy.total_asset, original.total_asset);
    assert_eq!(copy.total_liability, original.total_liability);
    assert_eq!(copy.total_income, original.total_income);
    assert_eq!(copy.total_expense, original.total_expense);
}

#[test]
fn export_record_of_missing_month_fails() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("missing.csv");
    let out_str = out_path.to_string_lossy().to_string();
    let err = run_export(
        &conn,
        &["record", "--year", "2026", "--month", "2", "--out", &out_str],
    )
    .unwrap_err();
    assert!(err.to_string().contains("2026-02"));
    assert!(!out_path.exists());
}

#[test]
fn export_full_bundles_plan_and_records() {
    let mut conn = seeded();
    plan::create_or_update_plan(
        &mut conn,
        &serde_json::from_value(json!({
            "year": 2026,
            "annual_incomes": [
                {"income_type": "SALARY", "name": "Salary", "amount": "40", "is_monthly": true}
            ]
        }))
        .unwrap(),
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("2026.json");
    let out_str = out_path.to_string_lossy().to_string();
    run_export(&conn, &["full", "--year", "2026", "--out", &out_str]).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(parsed["year"], json!(2026));
    assert_eq!(parsed["plan"]["year"], json!(2026));
    assert_eq!(parsed["plan"]["annual_surplus"], json!("480"));
    assert_eq!(parsed["records"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["records"][0]["month"], json!(1));
    assert_eq!(parsed["records"][0]["asset_details"][0]["name"], json!("Cash"));
}

#[test]
fn export_full_without_a_plan_writes_null() {
    let conn = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("2026.json");
    let out_str = out_path.to_string_lossy().to_string();
    run_export(&conn, &["full", "--year", "2026", "--out", &out_str]).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert!(parsed["plan"].is_null());
    assert_eq!(parsed["records"][0]["total_asset"], json!("150.25"));
}
