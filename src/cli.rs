// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn year_arg() -> Arg {
    Arg::new("year")
        .long("year")
        .short('y')
        .help("Year (defaults to the current year)")
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .short('m')
        .help("Month 1-12 (defaults to the current month)")
}

fn id_arg() -> Arg {
    Arg::new("id").long("id").required(true).help("Record id")
}

fn plan_cmd() -> Command {
    Command::new("plan")
        .about("Annual plan: targets, incomes and budget categories")
        .subcommand(json_flags(
            Command::new("show")
                .about("Show a year's plan with live spent amounts")
                .arg(year_arg()),
        ))
        .subcommand(
            Command::new("set")
                .about("Create or update a plan from a JSON request")
                .arg(
                    Arg::new("file")
                        .long("file")
                        .required(true)
                        .help("JSON plan request; collections left out stay unchanged"),
                ),
        )
        .subcommand(json_flags(
            Command::new("summary")
                .about("Recompute and store surplus and spent figures")
                .arg(year_arg()),
        ))
        .subcommand(json_flags(
            Command::new("years").about("List years that have a plan"),
        ))
}

fn record_cmd() -> Command {
    Command::new("record")
        .about("Monthly records of actual balances and flows")
        .subcommand(json_flags(
            Command::new("show")
                .about("Show one month with its lines")
                .arg(year_arg())
                .arg(month_arg()),
        ))
        .subcommand(json_flags(
            Command::new("list")
                .about("List a year's records")
                .arg(year_arg()),
        ))
        .subcommand(json_flags(
            Command::new("create")
                .about("Create a month; without --lines it starts from last month's skeleton")
                .arg(year_arg())
                .arg(month_arg())
                .arg(Arg::new("summary").long("summary"))
                .arg(
                    Arg::new("lines")
                        .long("lines")
                        .help("JSON file with asset/liability/income/expense details"),
                ),
        ))
        .subcommand(json_flags(
            Command::new("update")
                .about("Replace a record's summary and lines")
                .arg(id_arg())
                .arg(Arg::new("year").long("year").short('y'))
                .arg(Arg::new("month").long("month").short('m'))
                .arg(Arg::new("summary").long("summary"))
                .arg(
                    Arg::new("lines")
                        .long("lines")
                        .required(true)
                        .help("JSON file with asset/liability/income/expense details"),
                ),
        ))
        .subcommand(Command::new("delete").about("Delete a record").arg(id_arg()))
        .subcommand(json_flags(
            Command::new("template")
                .about("Preview the skeleton a new month would start from")
                .arg(year_arg())
                .arg(month_arg()),
        ))
}

fn dashboard_cmd() -> Command {
    Command::new("dashboard")
        .about("Read-only views across plans and records")
        .subcommand(json_flags(
            Command::new("overview")
                .about("Totals of one month")
                .arg(year_arg())
                .arg(month_arg()),
        ))
        .subcommand(json_flags(
            Command::new("asset-trend")
                .about("Assets, liabilities and net worth per month")
                .arg(year_arg()),
        ))
        .subcommand(json_flags(
            Command::new("cashflow")
                .about("Income, expense and surplus per month")
                .arg(year_arg()),
        ))
        .subcommand(json_flags(
            Command::new("distribution")
                .about("Holdings per asset group against the plan targets")
                .arg(year_arg())
                .arg(month_arg()),
        ))
        .subcommand(json_flags(
            Command::new("progress")
                .about("Plan surplus and budget execution")
                .arg(year_arg()),
        ))
        .subcommand(json_flags(
            Command::new("target-trend")
                .about("Monthly actuals against annual targets")
                .arg(year_arg()),
        ))
        .subcommand(json_flags(
            Command::new("budget-pie")
                .about("Annualized budgets and share of spend per category")
                .arg(year_arg()),
        ))
}

pub fn build_cli() -> Command {
    Command::new("moneyplan")
        .about("Household annual plan and monthly ledger")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(plan_cmd())
        .subcommand(record_cmd())
        .subcommand(dashboard_cmd())
        .subcommand(
            Command::new("import")
                .about("Import records or plans")
                .subcommand(
                    Command::new("record")
                        .about("Import a month's lines from CSV (section,group,name,amount,rate,note,category_id)")
                        .arg(year_arg())
                        .arg(month_arg())
                        .arg(Arg::new("path").long("path").required(true)),
                )
                .subcommand(
                    Command::new("plan")
                        .about("Import a plan from a JSON request")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export records or plans")
                .subcommand(
                    Command::new("records")
                        .about("Export a year's monthly totals")
                        .arg(year_arg())
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("record")
                        .about("Export one month's lines as a re-importable CSV")
                        .arg(year_arg())
                        .arg(month_arg())
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("plan")
                        .about("Export a plan as a re-importable JSON request")
                        .arg(year_arg())
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("full")
                        .about("Export a year's plan and records as one JSON document")
                        .arg(year_arg())
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(json_flags(
                    Command::new("show").about("Show database path and settings"),
                ))
                .subcommand(
                    Command::new("set-currency")
                        .about("Set the display currency code")
                        .arg(Arg::new("code").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Report data inconsistencies"))
}
