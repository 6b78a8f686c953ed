// SPDX-License-Identifier: Unlicense
use std::path::PathBuf;

use clap::Parser;
use lang::config::{DriverOptions, NumericPolicy, DEFAULT_MAX_NESTING};
use lang::driver::{parse_file_with, Driver};
use tracing_subscriber::EnvFilter;

/// Parse a source file and print its syntax tree.
#[derive(Parser, Debug)]
#[command(name = "langc")]
struct Args {
    /// Source file; standard input when omitted.
    input: Option<PathBuf>,

    /// Convert malformed numeric literals from their longest valid prefix
    /// instead of rejecting them.
    #[arg(long)]
    permissive_numbers: bool,

    /// Deepest nesting of parentheses and prefix operators to accept.
    #[arg(long, default_value_t = DEFAULT_MAX_NESTING)]
    max_nesting: usize,

    /// Also print every arena node in creation order.
    #[arg(long)]
    dump_arena: bool,
}

fn run(args: &Args) -> anyhow::Result<()> {
    let policy = if args.permissive_numbers {
        NumericPolicy::Permissive
    } else {
        NumericPolicy::Strict
    };
    let options = DriverOptions::default()
        .with_numeric_policy(policy)
        .with_max_nesting(args.max_nesting);

    let (driver, root) = match &args.input {
        Some(path) => parse_file_with(path, options)?,
        None => {
            let mut driver = Driver::with_options(options);
            let root = driver.build_ast(std::io::stdin().lock())?;
            (driver, root)
        }
    };

    println!("{}", driver.arena().render(root));
    if args.dump_arena {
        for (id, node) in driver.arena().iter() {
            println!("{:>4}: {:?}", id.index(), node.kind);
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("failed to parse:\n{e:#}");
        std::process::exit(1);
    }
}
