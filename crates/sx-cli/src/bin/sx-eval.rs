#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use sx_columnar::{ColumnProvider, ResultsTable};
use sx_expr::evaluate;
use sx_io::read_csv_path;
use sx_runtime::{HostConfig, HostRecord, commit_result, run_macro, write_record};
use sx_types::AggregatorKind;

#[derive(Debug, Clone, Default)]
struct CliArgs {
    table: Option<PathBuf>,
    config: Option<PathBuf>,
    commit: bool,
    macro_options: Option<String>,
    list_columns: bool,
    expression: Option<String>,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("sx-eval error: {error}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let config = match args.config.as_deref() {
        Some(path) => HostConfig::from_path(path).map_err(|error| error.to_string())?,
        None => HostConfig::default(),
    };
    let table = args
        .table
        .as_deref()
        .map(read_csv_path)
        .transpose()
        .map_err(|error| error.to_string())?;
    let columns = table.as_ref().map(|table| table as &dyn ColumnProvider);

    if args.list_columns {
        print_columns(table.as_ref());
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    if let Some(options) = args.macro_options.as_deref() {
        let (_, record) = run_macro(options, &config, columns);
        return write_record(&mut stdout, &record).map_err(|error| error.to_string());
    }

    let expression = args.expression.unwrap_or_default();
    let outcome = evaluate(&expression, columns);
    if args.commit {
        let record = HostRecord::Result(commit_result(&outcome, &config));
        write_record(&mut stdout, &record).map_err(|error| error.to_string())
    } else {
        println!("{outcome}");
        Ok(())
    }
}

fn print_columns(table: Option<&ResultsTable>) {
    let aggregators = AggregatorKind::ALL
        .iter()
        .map(|kind| kind.name())
        .collect::<Vec<_>>();
    println!("aggregators: {}", aggregators.join(" "));
    match table {
        Some(table) => {
            for name in table.column_names() {
                println!("column: {name}");
            }
        }
        None => println!("no results table"),
    }
}

fn parse_args() -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--table" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--table requires a path".to_owned())?;
                parsed.table = Some(PathBuf::from(value));
            }
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--config requires a path".to_owned())?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--macro" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--macro requires an option string".to_owned())?;
                parsed.macro_options = Some(value);
            }
            "--commit" => {
                parsed.commit = true;
            }
            "--list-columns" => {
                parsed.list_columns = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown argument: {other}"));
            }
            expression => {
                if parsed.expression.is_some() {
                    return Err(format!(
                        "unexpected extra argument: {expression} (quote the expression)"
                    ));
                }
                parsed.expression = Some(expression.to_owned());
            }
        }
    }

    if parsed.expression.is_some() && parsed.macro_options.is_some() {
        return Err("give either an expression or --macro, not both".to_owned());
    }
    Ok(parsed)
}

fn print_help() {
    println!(
        "sx-eval\n\
         Usage:\n\
         \tsx-eval [--table <csv>] [--config <json>] [--commit] [--list-columns] <expression>\n\
         \tsx-eval [--table <csv>] [--config <json>] --macro <options>\n\
         Options:\n\
         \t--table <csv>        results table; header row names the columns\n\
         \t--config <json>      host configuration (macro_field, fallback_result, finite_only)\n\
         \t--commit             print the RESULT record the host would receive\n\
         \t--macro <options>    read the expression from a macro option string, e.g. \"expr=[SUM('Area')]\"\n\
         \t--list-columns       print aggregator and column names, then exit\n\
         \t-h, --help           show this help"
    );
}
