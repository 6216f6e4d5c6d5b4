// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn account_arg() -> Arg {
    Arg::new("account")
        .long("account")
        .short('a')
        .required(true)
        .help("Account name")
}

fn output_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    ]
}

fn filter_args() -> [Arg; 5] {
    [
        Arg::new("kind")
            .long("kind")
            .help("expense | sale | ad_spend"),
        Arg::new("category").long("category").short('c'),
        Arg::new("recurring")
            .long("recurring")
            .value_parser(value_parser!(bool))
            .help("true = recurring only, false = one-off only"),
        Arg::new("from").long("from").help("YYYY-MM-DD, inclusive"),
        Arg::new("to").long("to").help("YYYY-MM-DD, inclusive"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("financeinfo")
        .about("Sales, expense and ad-spend ledger for digital-product sellers")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("currency").long("currency").default_value("BRL")),
                )
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("record")
                .about("Record, list and delete financial records")
                .subcommand(
                    Command::new("add")
                        .arg(account_arg())
                        .arg(Arg::new("kind").long("kind").required(true))
                        .arg(Arg::new("category").long("category").short('c').required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_hyphen_values(true),
                        )
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(
                            Arg::new("recurring")
                                .long("recurring")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(Arg::new("description").long("description").short('d')),
                )
                .subcommand(
                    Command::new("list")
                        .arg(account_arg())
                        .args(filter_args())
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        )
                        .args(output_args()),
                )
                .subcommand(
                    Command::new("rm").arg(account_arg()).arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregated views")
                .subcommand(
                    Command::new("summary")
                        .about("Counts and totals per category")
                        .arg(account_arg())
                        .args(filter_args())
                        .arg(
                            Arg::new("ranked")
                                .long("ranked")
                                .action(ArgAction::SetTrue)
                                .help("Order by total instead of name"),
                        )
                        .args(output_args()),
                )
                .subcommand(
                    Command::new("overview")
                        .about("Revenue, costs, estimated tax and ROAS")
                        .arg(account_arg())
                        .arg(Arg::new("from").long("from"))
                        .arg(Arg::new("to").long("to"))
                        .args(output_args()),
                )
                .subcommand(
                    Command::new("cashflow")
                        .arg(account_arg())
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .value_parser(value_parser!(usize))
                                .default_value("12"),
                        )
                        .args(output_args()),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Tax and notification settings")
                .subcommand(
                    Command::new("tax")
                        .arg(account_arg())
                        .arg(Arg::new("regime").long("regime").help("simple | presumed | exempt"))
                        .arg(Arg::new("rate").long("rate").help("Percent, 0-100"))
                        .arg(Arg::new("basis").long("basis").help("revenue | profit")),
                )
                .subcommand(
                    Command::new("notify")
                        .arg(account_arg())
                        .arg(
                            Arg::new("sales_alerts")
                                .long("sales-alerts")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("weekly_digest")
                                .long("weekly-digest")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("email_reports")
                                .long("email-reports")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("low_margin")
                                .long("low-margin")
                                .help("Percent, or 'off'"),
                        ),
                )
                .subcommand(Command::new("show").arg(account_arg()).args(output_args())),
        )
        .subcommand(
            Command::new("import")
                .about("Bulk import")
                .subcommand(
                    Command::new("csv")
                        .about("date,kind,category,amount,recurring,description")
                        .arg(account_arg())
                        .arg(Arg::new("path").long("path").required(true)),
                )
                .subcommand(
                    Command::new("kirvano")
                        .about("Kirvano webhook payload(s) as JSON")
                        .arg(account_arg())
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("records")
                    .arg(account_arg())
                    .arg(Arg::new("format").long("format").default_value("csv"))
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("cache")
                .about("Summary cache maintenance")
                .subcommand(Command::new("clear")),
        )
}
