use std::io::{self, BufRead};

use anyhow::Context;
use clap::Parser;
use css_selector_parser::{parse_with, ParseOptions, Parsed, StartRule, DEFAULT_MAX_DEPTH};
use slog::{info, o, Drain, Level, Logger};

/// Check CSS selectors and print their syntax tree
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// selectors to parse, one per line from stdin when none are given
    selectors: Vec<String>,

    /// grammar entry point: start or start_text
    #[arg(long, default_value = "start")]
    start_rule: StartRule,

    /// maximum bracket nesting
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// log parser activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::Debug } else { Level::Info };
    let decorator = slog_term::PlainSyncDecorator::new(std::io::stderr());
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog::LevelFilter::new(drain, level).fuse();
    let logger = Logger::root(drain, o!());

    let options = ParseOptions::default()
        .with_start_rule(args.start_rule)
        .with_max_depth(args.max_depth)
        .with_logger(logger.clone());

    let inputs = if args.selectors.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .filter(|line| !matches!(line, Ok(line) if line.trim().is_empty()))
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read selectors from stdin")?
    } else {
        args.selectors
    };

    let mut failed = 0;
    for input in &inputs {
        match parse_with(input, &options) {
            Ok(Parsed::Selectors(list)) => println!("{:#?}", list),
            Ok(Parsed::Text(value)) => println!("{:#?}", value),
            Err(err) => {
                failed += 1;
                eprintln!("{:?}", miette::Report::new(err));
            }
        }
    }

    info!(logger, "checked selectors"; "total" => inputs.len(), "failed" => failed);

    if failed > 0 {
        anyhow::bail!("{} of {} selectors failed to parse", failed, inputs.len());
    }
    Ok(())
}
