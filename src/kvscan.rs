const VERSION: &str = env!("CARGO_PKG_VERSION");

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;

use kvscan::logging::{self, LogLevel};
use kvscan::{load_config, load_entries, ConfigError, ConfigMap, Limits, OptionTable};

fn cli() -> Command {
    Command::new("kvscan")
        .version(VERSION)
        .about("Scan a key=value config file and print its params")
        .arg(
            Arg::new("config")
                .help("Path to config file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("max-name-length")
                .long("max-name-length")
                .help("Longest accepted param name (default: 30)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("max-value-length")
                .long("max-value-length")
                .help("Longest accepted param value (default: 255)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("DEBUG, INFO, WARN or ERROR (default: $KVSCAN_LOG_LEVEL or WARN)")
                .value_parser(clap::value_parser!(LogLevel)),
        )
        .arg(
            Arg::new("known")
                .long("known")
                .help("Accepted param name; repeat for each. Any other name is an error")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("ordered")
                .long("ordered")
                .help("Print params in file order, duplicates included, instead of sorted by name")
                .action(ArgAction::SetTrue),
        )
}

fn limits(matches: &ArgMatches) -> Limits {
    let mut limits = Limits::default();
    if let Some(len) = matches.get_one::<usize>("max-name-length") {
        limits = limits.with_max_name_length(*len);
    }
    if let Some(len) = matches.get_one::<usize>("max-value-length") {
        limits = limits.with_max_value_length(*len);
    }
    limits
}

fn run(config_path: &str, matches: &ArgMatches) -> Result<Vec<(String, String)>, ConfigError> {
    let limits = limits(matches);

    if matches.get_flag("ordered") {
        let entries = load_entries(config_path, &limits)?;
        if let Some(known) = known_options(matches) {
            let map: ConfigMap = entries
                .iter()
                .map(|e| (e.name.clone(), e.value.clone()))
                .collect();
            known.resolve(&map)?;
        }
        return Ok(entries.into_iter().map(|e| (e.name, e.value)).collect());
    }

    let config = load_config(config_path, &limits)?;
    if let Some(known) = known_options(matches) {
        known.resolve(&config)?;
    }
    let mut pairs: Vec<_> = config.into_iter().collect();
    pairs.sort();
    Ok(pairs)
}

fn known_options(matches: &ArgMatches) -> Option<OptionTable> {
    let names = matches.get_many::<String>("known")?;
    Some(names.fold(OptionTable::new(), |table, name| table.declare_optional(name)))
}

fn main() -> ExitCode {
    let mut command = cli();
    let matches = command.get_matches_mut();
    let Some(config_path) = matches.get_one::<String>("config") else {
        command
            .error(ErrorKind::MissingRequiredArgument, "<config> is required")
            .exit()
    };

    let level = matches
        .get_one::<LogLevel>("log-level")
        .copied()
        .or_else(|| {
            std::env::var("KVSCAN_LOG_LEVEL")
                .ok()
                .map(|v| LogLevel::parse_lenient(&v))
        })
        .unwrap_or(LogLevel::Warn);
    logging::init(level);

    match run(config_path, &matches) {
        Ok(pairs) => {
            info!(count = pairs.len(), "config accepted");
            for (name, value) in pairs {
                println!("param={} value={}", name, value);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
